//! Scene-builder contract and the import drivers that feed it
//!
//! Decoders know nothing about scenes. The drivers here turn decoded plain
//! data into builder calls the way a 3D host expects it: mesh objects with
//! per-loop attributes, armatures in the host's axis convention, and one
//! keyframe per frame index.

use std::f32::consts::FRAC_PI_2;

use pmt_core::{Vec2, Vec3};
use pmt_parsers::{AnimationClip, MeshFile, MeshFormat, Skeleton};
use serde::Serialize;

/// A renderable mesh object
///
/// `loop_uvs` and `loop_normals` hold one entry per face corner, in face
/// order, since hosts store custom normals and UVs per loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshObject {
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
    pub loop_uvs: Vec<Vec2>,
    pub loop_normals: Vec<Vec3>,
    /// Object rotation as XYZ Euler angles in radians
    pub rotation: Vec3,
}

/// One bone of an armature, in host coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArmatureBone {
    pub name: String,
    pub head: Vec3,
    pub tail: Vec3,
    pub parent: Option<String>,
}

/// IK constraint placed on `owner`, aiming at `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IkLink {
    pub owner: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Armature {
    pub name: String,
    pub bones: Vec<ArmatureBone>,
    pub ik: Vec<IkLink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Keyframe {
    pub frame: usize,
    pub location: Vec3,
    pub rotation: Vec3,
}

/// Host scene graph that decoded assets are imported into
pub trait SceneBuilder {
    type Error;

    /// Create a mesh object
    fn add_mesh(&mut self, mesh: MeshObject) -> Result<(), Self::Error>;

    /// Create a bone hierarchy
    fn add_armature(&mut self, armature: Armature) -> Result<(), Self::Error>;

    /// Insert location/rotation keys on the object called `target`
    fn insert_keyframes(&mut self, target: &str, keys: &[Keyframe]) -> Result<(), Self::Error>;

    /// Set the timeline range. Builders without a timeline ignore it.
    fn set_frame_range(&mut self, _start: usize, _end: usize) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Build mesh objects for every block of a decoded file.
///
/// Objects are named `{stem}_{index}`; wcm blocks use their own name
/// instead of the stem.
pub fn mesh_objects(file: &MeshFile, stem: &str) -> Vec<MeshObject> {
    file.blocks
        .iter()
        .enumerate()
        .map(|(idx, block)| {
            let base = match (&block.name, file.format) {
                (Some(name), MeshFormat::Wcm) => name.as_str(),
                _ => stem,
            };

            let corners = block.faces.iter().flatten().map(|&i| usize::from(i));
            let loop_uvs = corners
                .clone()
                .map(|i| block.uvs.get(i).copied().unwrap_or(Vec2::ZERO))
                .collect();
            let loop_normals = corners
                .map(|i| block.normals.get(i).copied().unwrap_or(Vec3::ZERO))
                .collect();

            MeshObject {
                name: format!("{base}_{idx}"),
                vertices: block.vertices.clone(),
                faces: block
                    .faces
                    .iter()
                    .map(|f| f.map(u32::from))
                    .collect(),
                loop_uvs,
                loop_normals,
                rotation: Vec3::new(FRAC_PI_2, 0.0, 0.0),
            }
        })
        .collect()
}

/// Import every block of a mesh file; returns the number of objects created
pub fn import_mesh<B: SceneBuilder>(
    builder: &mut B,
    file: &MeshFile,
    stem: &str,
) -> Result<usize, B::Error> {
    let objects = mesh_objects(file, stem);
    let count = objects.len();
    for object in objects {
        tracing::debug!(name = %object.name, vertices = object.vertices.len(), "Adding mesh object");
        builder.add_mesh(object)?;
    }
    Ok(count)
}

/// Convert a decoded skeleton to an armature, swapping Y and Z into the
/// host's up axis
pub fn armature_from_skeleton(skeleton: &Skeleton, name: &str) -> Armature {
    let tree = &skeleton.tree;
    let bones = tree
        .bones
        .iter()
        .map(|b| ArmatureBone {
            name: b.name.clone(),
            head: b.head.swap_yz(),
            tail: b.tail.swap_yz(),
            parent: b.parent.and_then(|p| tree.get(p)).map(|p| p.name.clone()),
        })
        .collect();

    let ik = tree
        .ik_constraints()
        .into_iter()
        .filter_map(|c| {
            Some(IkLink {
                owner: tree.get(c.owner)?.name.clone(),
                target: tree.get(c.target)?.name.clone(),
            })
        })
        .collect();

    Armature {
        name: name.to_string(),
        bones,
        ik,
    }
}

/// Import a skeleton as one armature; returns the number of bones
pub fn import_skeleton<B: SceneBuilder>(
    builder: &mut B,
    skeleton: &Skeleton,
    name: &str,
) -> Result<usize, B::Error> {
    let armature = armature_from_skeleton(skeleton, name);
    let count = armature.bones.len();
    builder.add_armature(armature)?;
    Ok(count)
}

/// Import an animation clip: one keyed object per track name.
///
/// Tracks sharing a name are merged before keying, and the timeline runs
/// from 1 to the longest merged track.
pub fn import_animation<B: SceneBuilder>(
    builder: &mut B,
    clip: &AnimationClip,
) -> Result<usize, B::Error> {
    let groups = clip.grouped();
    if groups.is_empty() {
        return Ok(0);
    }

    builder.set_frame_range(1, clip.total_frames())?;
    for group in &groups {
        let keys: Vec<Keyframe> = group
            .frames
            .iter()
            .enumerate()
            .map(|(frame, f)| Keyframe {
                frame,
                location: f.location,
                rotation: f.rotation,
            })
            .collect();
        builder.insert_keyframes(&group.group_name, &keys)?;
    }
    Ok(groups.len())
}
