// pmt-parsers/src/skel/mod.rs
//! Skeleton decoder for `.skel` files
//!
//! # Format Structure
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  Sentinel: FF FF FF FF 00 00 00 00 00 00 00 00         │
//! ├────────────────────────────────────────────────────────┤
//! │  Name list, in depth-first order:                      │
//! │    u32 name length | ASCII name | u32 level            │
//! ├────────────────────────────────────────────────────────┤
//! │  Transform list, one per bone (28 bytes):              │
//! │    head f32×3 | tail f32×3 | end tag f32               │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing records where the name list ends. After each bone the next 28
//! bytes are inspected: a transform slot starts with a zero-length "name"
//! and ends in the byte `0x3f` (the high byte of an end tag near 1.0).

mod hierarchy;

pub use hierarchy::{reconstruct, Bone, BoneTransform, IkConstraint, SkeletonBone, SkeletonTree};

use crate::binary::ByteCursor;
use crate::logging::instrument_parse;
use crate::traits::{
    DecodeOutcome, HierarchicalParser, HumanReadable, ParseError, ParseOptions, ParsePhase,
    ParseResult, Parser,
};

/// Every `.skel` file starts with these bytes
pub const SKEL_MAGIC: [u8; 12] = [0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0, 0];

/// Size of one transform record
pub const TRANSFORM_LEN: usize = 28;

const LIST_END_TAG: u8 = 0x3f;

/// A decoded `.skel` file
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    /// Every bone read from the name list
    pub bones: Vec<Bone>,
    /// Transforms, index-aligned with `bones`; may be shorter
    pub transforms: Vec<BoneTransform>,
    /// Bones that have a transform, linked into a tree
    pub tree: SkeletonTree,
    pub outcome: DecodeOutcome,
}

fn read_bone_fields(cursor: &mut ByteCursor<'_>) -> ParseResult<Bone> {
    let len = cursor.u32()? as usize;
    let at = cursor.position();
    let name = cursor.string(len)?;
    if !name.is_ascii() {
        return Err(ParseError::malformed(at, format!("bone name '{name}' is not ASCII")));
    }
    let level = cursor.u32()?;
    Ok(Bone { name, level })
}

/// Read one name-list record; on failure the cursor is left where it was
fn read_bone(cursor: &mut ByteCursor<'_>) -> ParseResult<Bone> {
    let start = cursor.position();
    read_bone_fields(cursor).inspect_err(|_| cursor.seek(start))
}

/// Whether the slot at the cursor is the first transform rather than a bone
fn at_list_end(cursor: &ByteCursor<'_>) -> ParseResult<bool> {
    let next_len = cursor.peek_u32()?;
    let last = cursor.peek_u8(TRANSFORM_LEN - 1)?;
    Ok(next_len == 0 && last == LIST_END_TAG)
}

fn read_bone_list(cursor: &mut ByteCursor<'_>) -> (Vec<Bone>, Option<ParseError>) {
    let mut bones = Vec::new();

    loop {
        match read_bone(cursor) {
            Ok(bone) => {
                tracing::trace!(name = %bone.name, level = bone.level, "Read bone");
                bones.push(bone);
            }
            Err(e) => return (bones, Some(e)),
        }

        match at_list_end(cursor) {
            Ok(true) => return (bones, None),
            Ok(false) => {}
            Err(e) => return (bones, Some(e)),
        }
    }
}

fn read_transform(cursor: &mut ByteCursor<'_>) -> ParseResult<BoneTransform> {
    let raw = cursor.bytes(TRANSFORM_LEN)?;
    let mut record = ByteCursor::new(raw);
    Ok(BoneTransform {
        head: record.vec3()?,
        tail: record.vec3()?,
        end_tag: record.f32()?,
    })
}

/// Decoder for `.skel` files
#[derive(Debug, Clone, Copy, Default)]
pub struct SkelParser;

impl SkelParser {
    pub fn new() -> Self {
        Self
    }

    fn decode(&self, data: &[u8]) -> ParseResult<Skeleton> {
        if !data.starts_with(&SKEL_MAGIC) {
            return Err(ParseError::InvalidMagic {
                expected: SKEL_MAGIC.to_vec(),
                found: data.iter().take(SKEL_MAGIC.len()).copied().collect(),
            });
        }

        let mut cursor = ByteCursor::at(data, SKEL_MAGIC.len());
        let (bones, list_error) = read_bone_list(&mut cursor);
        let mut outcome = match list_error {
            Some(error) => DecodeOutcome::stopped(ParsePhase::ReadingBones, error),
            None => DecodeOutcome::Complete,
        };

        let mut transforms = Vec::with_capacity(bones.len());
        for bone in &bones {
            match read_transform(&mut cursor) {
                Ok(xf) => transforms.push(xf),
                Err(error) => {
                    tracing::debug!(bone = %bone.name, %error, "Transform list ended early");
                    if outcome.is_complete() {
                        outcome = DecodeOutcome::stopped(ParsePhase::ReadingTransforms, error);
                    }
                    break;
                }
            }
        }

        let tree = reconstruct(&bones, &transforms);
        Ok(Skeleton {
            bones,
            transforms,
            tree,
            outcome,
        })
    }
}

impl Parser for SkelParser {
    type Output = Skeleton;

    fn extensions(&self) -> &[&str] {
        &["skel"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&SKEL_MAGIC)
    }

    fn name(&self) -> &str {
        "Skeleton Decoder"
    }

    fn parse_with_options(
        &self,
        data: &[u8],
        stem: &str,
        _options: &ParseOptions,
    ) -> ParseResult<Self::Output> {
        instrument_parse(self.name(), || {
            let skeleton = self.decode(data)?;
            if !skeleton.outcome.is_complete() {
                tracing::warn!(stem, outcome = %skeleton.outcome, "Skeleton decode stopped early");
            }
            tracing::info!(
                stem,
                bones = skeleton.bones.len(),
                transforms = skeleton.transforms.len(),
                roots = skeleton.tree.roots.len(),
                "Decoded skeleton"
            );
            Ok(skeleton)
        })
    }
}

impl HierarchicalParser for SkelParser {
    type Node = SkeletonBone;

    fn roots<'a>(&self, parsed: &'a Self::Output) -> Vec<&'a Self::Node> {
        parsed
            .tree
            .roots
            .iter()
            .filter_map(|&i| parsed.tree.get(i))
            .collect()
    }

    fn children<'a>(&self, parsed: &'a Self::Output, node: &Self::Node) -> Vec<&'a Self::Node> {
        parsed
            .tree
            .children(node.index)
            .into_iter()
            .filter_map(|i| parsed.tree.get(i))
            .collect()
    }
}

impl HumanReadable for Skeleton {
    fn to_readable_string(&self) -> String {
        fn walk(tree: &SkeletonTree, index: usize, depth: usize, out: &mut String) {
            if let Some(bone) = tree.get(index) {
                out.push_str(&format!("{}{} (level {})\n", "  ".repeat(depth + 1), bone.name, bone.level));
                for child in tree.children(index) {
                    walk(tree, child, depth + 1, out);
                }
            }
        }

        let mut out = format!(
            "Skeleton: {} bone(s), {} transform(s) ({})\n",
            self.bones.len(),
            self.transforms.len(),
            self.outcome
        );
        for &root in &self.tree.roots {
            walk(&self.tree, root, 0, &mut out);
        }
        out
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "bones": self.tree.bones.iter().map(|b| serde_json::json!({
                "name": b.name,
                "level": b.level,
                "parent": b.parent.and_then(|p| self.tree.get(p)).map(|p| p.name.clone()),
                "head": b.head,
                "tail": b.tail,
            })).collect::<Vec<_>>(),
            "unplaced": self.bones.len() - self.tree.bone_count(),
            "ik_constraints": self.tree.ik_constraints(),
            "outcome": self.outcome.to_json(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_magic() {
        let err = SkelParser::new().parse(&[0u8; 16], "bad").unwrap_err();
        assert!(matches!(err, ParseError::InvalidMagic { .. }));
    }

    #[test]
    fn test_magic_only() {
        let skel = SkelParser::new().parse(&SKEL_MAGIC, "empty").unwrap();
        assert!(skel.bones.is_empty());
        assert!(matches!(
            skel.outcome,
            DecodeOutcome::Stopped { phase: ParsePhase::ReadingBones, .. }
        ));
    }

    #[test]
    fn test_list_end_detection() {
        let mut slot = vec![0u8; TRANSFORM_LEN];
        slot[TRANSFORM_LEN - 1] = LIST_END_TAG;
        assert!(at_list_end(&ByteCursor::new(&slot)).unwrap());

        slot[0] = 3;
        assert!(!at_list_end(&ByteCursor::new(&slot)).unwrap());
        assert!(at_list_end(&ByteCursor::new(&slot[..10])).is_err());
    }
}
