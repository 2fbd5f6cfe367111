// pmt-parsers/src/skel/hierarchy.rs
//! Skeleton tree reconstruction from depth levels
//!
//! `.skel` files store each bone's depth but no parent index. A bone at level
//! `n` is attached to the nearest bone (by head position) at level `n - 1`,
//! and that parent's tail is moved onto the child's head so the chain is
//! visually connected. Equally near candidates resolve to the earliest one.

use pmt_core::Vec3;
use serde::Serialize;

/// A bone's name and depth as listed in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bone {
    pub name: String,
    /// Depth in the hierarchy, 1 for roots
    pub level: u32,
}

/// A bone's rest transform as stored in the file
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoneTransform {
    pub head: Vec3,
    pub tail: Vec3,
    pub end_tag: f32,
}

/// A bone placed in the reconstructed tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkeletonBone {
    /// Position in [`SkeletonTree::bones`]
    pub index: usize,
    pub name: String,
    pub level: u32,
    pub head: Vec3,
    pub tail: Vec3,
    pub end_tag: f32,
    pub parent: Option<usize>,
}

impl SkeletonBone {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn length(&self) -> f32 {
        self.head.distance(&self.tail)
    }
}

/// An IK constraint: `owner` follows `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IkConstraint {
    pub owner: usize,
    pub target: usize,
}

/// Bones linked into parent/child relationships
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkeletonTree {
    pub bones: Vec<SkeletonBone>,
    pub roots: Vec<usize>,
}

impl SkeletonTree {
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn get(&self, index: usize) -> Option<&SkeletonBone> {
        self.bones.get(index)
    }

    /// Index of the first bone with this name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn children(&self, index: usize) -> Vec<usize> {
        self.bones
            .iter()
            .filter(|b| b.parent == Some(index))
            .map(|b| b.index)
            .collect()
    }

    /// Indices from a bone up to its root, the bone itself first
    pub fn chain_to_root(&self, index: usize) -> Vec<usize> {
        let mut chain = vec![index];
        let mut current = index;

        while let Some(parent) = self.bones.get(current).and_then(|b| b.parent) {
            // parents always sit one level up, so this cannot cycle
            chain.push(parent);
            current = parent;
        }

        chain
    }

    pub fn max_level(&self) -> u32 {
        self.bones.iter().map(|b| b.level).max().unwrap_or(0)
    }

    /// Pair every bone whose name contains `IK` with the bone named the
    /// same without it. The plain bone owns the constraint.
    pub fn ik_constraints(&self) -> Vec<IkConstraint> {
        self.bones
            .iter()
            .filter(|b| b.name.contains("IK"))
            .filter_map(|ik| {
                let plain = ik.name.replace("IK", "");
                self.find(&plain).map(|owner| IkConstraint {
                    owner,
                    target: ik.index,
                })
            })
            .collect()
    }
}

/// Link bones into a tree. Bones without a matching transform are dropped.
pub fn reconstruct(bones: &[Bone], transforms: &[BoneTransform]) -> SkeletonTree {
    let mut nodes: Vec<SkeletonBone> = bones
        .iter()
        .zip(transforms)
        .enumerate()
        .map(|(index, (bone, xf))| SkeletonBone {
            index,
            name: bone.name.clone(),
            level: bone.level,
            head: xf.head,
            tail: xf.tail,
            end_tag: xf.end_tag,
            parent: None,
        })
        .collect();

    for i in 0..nodes.len() {
        let level = nodes[i].level;
        if level <= 1 {
            continue;
        }

        let head = nodes[i].head;
        let closest = nodes
            .iter()
            .filter(|candidate| candidate.level == level - 1)
            .min_by(|a, b| a.head.distance(&head).total_cmp(&b.head.distance(&head)))
            .map(|candidate| candidate.index);

        if let Some(parent) = closest {
            nodes[i].parent = Some(parent);
            nodes[parent].tail = head;
        } else {
            tracing::debug!(bone = %nodes[i].name, level, "No bone one level up, kept as root");
        }
    }

    let roots = nodes.iter().filter(|b| b.is_root()).map(|b| b.index).collect();
    SkeletonTree { bones: nodes, roots }
}
