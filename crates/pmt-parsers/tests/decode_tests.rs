//! Decoding tests over synthetic asset buffers
//!
//! These tests cover:
//! - Half-float decoding over every bit pattern
//! - Prop, map and wcm mesh walks, including early stops
//! - Block marker scanning
//! - Animation track scanning and embedded file name truncation
//! - Skeleton name lists, transforms and hierarchy reconstruction

use pmt_core::{Vec2, Vec3};
use pmt_parsers::mesh::{HEADER_LEN, MARKER_TO_HEADER};
use pmt_parsers::{
    decode_half, find_next_block, reconstruct, AnimParser, Bone, BoneTransform, DecodeOutcome,
    HierarchicalParser, HumanReadable, MeshFormat, MeshParser, ParseError, ParseOptions,
    ParsePhase, Parser, SkelParser,
};
use proptest::prelude::*;

const STRIDE: usize = 52;
const HALF_ONE: u16 = 0x3C00;
const HALF_HALF: u16 = 0x3800;
const HALF_QUARTER: u16 = 0x3400;
const HALF_NEG_TWO: u16 = 0xC000;

/// One vertex record before encoding
#[derive(Clone, Copy)]
struct Record {
    position: [f32; 3],
    normal: [u16; 3],
    uv: [u16; 2],
}

fn record(x: f32, y: f32, z: f32) -> Record {
    Record {
        position: [x, y, z],
        normal: [HALF_ONE, HALF_HALF, HALF_NEG_TWO],
        uv: [HALF_HALF, HALF_QUARTER],
    }
}

fn put_u32(out: &mut [u8], at: usize, value: u32) {
    out[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u16(out: &mut [u8], at: usize, value: u16) {
    out[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

/// Encode one block. Records at least 52 bytes wide get the end-of-record
/// marker in their first record, as real files do.
fn block_bytes(
    object_count: u32,
    records: &[Record],
    stride: usize,
    uv_at: usize,
    faces: &[[u16; 3]],
) -> Vec<u8> {
    let mut out = vec![0u8; HEADER_LEN];
    put_u32(&mut out, 0x00, object_count);
    put_u32(&mut out, 0x04, 1);
    put_u32(&mut out, 0x08, records.len() as u32);
    put_u32(&mut out, 0x19, (records.len() * stride) as u32);

    for (i, r) in records.iter().enumerate() {
        let mut raw = vec![0u8; stride];
        for (k, v) in r.position.iter().enumerate() {
            raw[k * 4..k * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        for (k, n) in r.normal.iter().enumerate() {
            put_u16(&mut raw, 0x0c + k * 2, *n);
        }
        put_u16(&mut raw, uv_at, r.uv[0]);
        put_u16(&mut raw, uv_at + 2, r.uv[1]);
        if i == 0 && stride >= STRIDE {
            raw[0x30..0x34].copy_from_slice(&[0xFF; 4]);
        }
        out.extend_from_slice(&raw);
    }

    out.extend_from_slice(&((faces.len() * 12) as u32).to_le_bytes());
    for face in faces {
        for idx in face {
            out.extend_from_slice(&u32::from(*idx).to_le_bytes());
        }
    }
    out
}

fn cameras() -> Vec<u8> {
    [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect()
}

fn triangle() -> Vec<Record> {
    vec![
        record(0.0, 0.0, 0.0),
        record(1.0, 0.0, 0.0),
        record(0.0, 1.0, 0.0),
    ]
}

/// Map file with the given blocks, each followed by a payload without markers
fn map_file(blocks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = cameras();
    for block in blocks {
        out.extend_from_slice(block);
        out.extend_from_slice(&[0x5A; 40]);
    }
    out
}

mod half_tests {
    use super::*;

    #[test]
    fn test_every_bit_pattern_decodes() {
        for bits in 0..=u16::MAX {
            let value = decode_half(&bits.to_le_bytes(), 0);
            let exponent = (bits >> 10) & 0x1F;

            if exponent == 31 {
                assert_eq!(value, 0.0, "bits {bits:#06x}");
            } else {
                assert!(value.is_finite(), "bits {bits:#06x}");
                assert_eq!(value, half::f16::from_bits(bits).to_f32(), "bits {bits:#06x}");
            }
        }
    }

    #[test]
    fn test_one() {
        assert_eq!(decode_half(&HALF_ONE.to_le_bytes(), 0), 1.0);
    }
}

mod mesh_tests {
    use super::*;

    #[test]
    fn test_map_two_vertex_block() {
        let records = [record(1.0, 2.0, 3.0), record(4.0, 5.0, 6.0)];
        let block = block_bytes(2, &records, STRIDE, STRIDE - 0x10, &[[0, 1, 0]]);
        let data = map_file(&[block]);

        let mesh = MeshParser::new(MeshFormat::Map).parse(&data, "harbor").unwrap();

        assert_eq!(mesh.outcome, DecodeOutcome::Complete);
        assert_eq!(mesh.cameras, Some([Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]));
        assert_eq!(mesh.blocks.len(), 1);

        let block = &mesh.blocks[0];
        assert_eq!(block.matrix_count, 2);
        assert_eq!(block.byte_size, 104);
        assert_eq!(block.vertices, vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
        assert_eq!(block.normals[1], Vec3::new(1.0, 0.5, -2.0));
        assert_eq!(block.uvs[0], Vec2::new(0.5, 0.75));
        assert_eq!(block.faces, vec![[0, 1, 0]]);
    }

    #[test]
    fn test_uv_flip_can_be_disabled() {
        let block = block_bytes(2, &triangle(), STRIDE, STRIDE - 0x10, &[[0, 1, 2]]);
        let data = map_file(&[block]);
        let options = ParseOptions {
            flip_uv_v: false,
            ..ParseOptions::default()
        };

        let mesh = MeshParser::new(MeshFormat::Map)
            .parse_with_options(&data, "harbor", &options)
            .unwrap();
        assert_eq!(mesh.blocks[0].uvs[0], Vec2::new(0.5, 0.25));
    }

    #[test]
    fn test_map_resyncs_between_blocks() {
        let first = block_bytes(3, &triangle(), STRIDE, STRIDE - 0x10, &[[0, 1, 2]]);
        let second = block_bytes(3, &triangle()[..2], STRIDE, STRIDE - 0x10, &[[0, 1, 1]]);
        let data = map_file(&[first, second]);

        let mesh = MeshParser::new(MeshFormat::Map).parse(&data, "harbor").unwrap();

        assert_eq!(mesh.outcome, DecodeOutcome::Complete);
        assert_eq!(mesh.blocks.len(), 2);
        assert_eq!(mesh.blocks[1].vertex_count(), 2);
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn test_map_without_next_marker() {
        let first = block_bytes(3, &triangle(), STRIDE, STRIDE - 0x10, &[[0, 1, 2]]);
        let data = map_file(&[first]);

        let mesh = MeshParser::new(MeshFormat::Map).parse(&data, "harbor").unwrap();

        assert_eq!(mesh.blocks.len(), 1);
        assert!(matches!(
            mesh.outcome,
            DecodeOutcome::Stopped {
                phase: ParsePhase::Scanning,
                error: ParseError::UnrecognizedTrailingData { .. }
            }
        ));
    }

    #[test]
    fn test_oversized_face_block_keeps_previous_blocks() {
        let first = block_bytes(4, &triangle(), STRIDE, STRIDE - 0x10, &[[0, 1, 2]]);
        let second = block_bytes(4, &triangle(), STRIDE, STRIDE - 0x10, &[[0, 1, 2]]);
        let face_size_at = HEADER_LEN + 3 * STRIDE;
        let mut data = map_file(&[first, second]);

        let second_start =
            find_next_block(&data, cameras().len() + HEADER_LEN + 3 * STRIDE).unwrap() as usize;
        let len = data.len() as u32;
        put_u32(&mut data, second_start + face_size_at, len);

        let mesh = MeshParser::new(MeshFormat::Map).parse(&data, "harbor").unwrap();

        assert_eq!(mesh.blocks.len(), 1);
        assert!(matches!(
            mesh.outcome,
            DecodeOutcome::Stopped {
                phase: ParsePhase::ParsingFaces,
                error: ParseError::MalformedHeader { .. }
            }
        ));
    }

    #[test]
    fn test_prop_blocks_are_contiguous() {
        let mut data = vec![0u8; 24];
        data.extend(block_bytes(3, &triangle(), STRIDE, STRIDE - 0x0c, &[[0, 1, 2]]));
        data.extend(block_bytes(3, &triangle(), STRIDE, STRIDE - 0x0c, &[[2, 1, 0]]));

        let mesh = MeshParser::new(MeshFormat::Prop).parse(&data, "crate").unwrap();

        assert_eq!(mesh.outcome, DecodeOutcome::Complete);
        assert_eq!(mesh.blocks.len(), 2);
        assert_eq!(mesh.blocks[1].faces, vec![[2, 1, 0]]);
        assert_eq!(mesh.blocks[0].uvs[2], Vec2::new(0.5, 0.75));
        assert!(mesh.cameras.is_none());
    }

    #[test]
    fn test_prop_stride_mismatch_returns_prior_blocks() {
        let mut data = vec![0u8; 24];
        data.extend(block_bytes(3, &triangle(), STRIDE, STRIDE - 0x0c, &[[0, 1, 2]]));
        data.extend(block_bytes(3, &triangle(), 48, 48 - 0x0c, &[[0, 1, 2]]));

        let mesh = MeshParser::new(MeshFormat::Prop).parse(&data, "crate").unwrap();

        assert_eq!(mesh.blocks.len(), 1);
        assert!(matches!(
            mesh.outcome,
            DecodeOutcome::Stopped { phase: ParsePhase::ReadingHeader, .. }
        ));
    }

    fn wcm_file(names: &[&str], repeated: u32, object_count: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(names.len() as u32).to_le_bytes());
        for name in names {
            out.extend_from_slice(&(name.len() as u32).to_le_bytes());
            out.extend_from_slice(name.as_bytes());
        }
        out.extend_from_slice(&repeated.to_le_bytes());
        out.extend(std::iter::repeat(0u8).take(names.len() * 0x18));
        for _ in names {
            out.extend(block_bytes(object_count, &triangle(), 0x20, 0x20 - 8, &[[0, 1, 2]]));
        }
        out
    }

    #[test]
    fn test_wcm_blocks_follow_name_table() {
        let data = wcm_file(&["body", "magazine"], 2, 10);

        let mesh = MeshParser::new(MeshFormat::Wcm).parse(&data, "rifle").unwrap();

        assert_eq!(mesh.outcome, DecodeOutcome::Complete);
        assert_eq!(mesh.names, vec!["body", "magazine"]);
        assert_eq!(mesh.blocks.len(), 2);
        assert_eq!(mesh.blocks[0].name.as_deref(), Some("body"));
        assert_eq!(mesh.blocks[1].name.as_deref(), Some("magazine"));
        assert_eq!(mesh.blocks[1].stride(), 0x20);
        assert_eq!(mesh.blocks[1].uvs[0], Vec2::new(0.5, 0.75));
    }

    #[test]
    fn test_wcm_object_count_still_ends_walk() {
        let data = wcm_file(&["body", "magazine", "scope"], 3, 2);

        let mesh = MeshParser::new(MeshFormat::Wcm).parse(&data, "rifle").unwrap();

        assert_eq!(mesh.outcome, DecodeOutcome::Complete);
        assert_eq!(mesh.blocks.len(), 1);
    }

    #[test]
    fn test_wcm_count_mismatch_is_error() {
        let data = wcm_file(&["body"], 2, 10);
        assert!(MeshParser::new(MeshFormat::Wcm).parse(&data, "rifle").is_err());
    }

    #[test]
    fn test_decoding_is_repeatable() {
        let first = block_bytes(3, &triangle(), STRIDE, STRIDE - 0x10, &[[0, 1, 2]]);
        let second = block_bytes(3, &triangle(), STRIDE, STRIDE - 0x10, &[[1, 2, 0]]);
        let data = map_file(&[first, second]);
        let parser = MeshParser::new(MeshFormat::Map);

        assert_eq!(parser.parse(&data, "harbor").unwrap(), parser.parse(&data, "harbor").unwrap());
    }

    #[test]
    fn test_summary_json() {
        let block = block_bytes(2, &triangle(), STRIDE, STRIDE - 0x10, &[[0, 1, 2]]);
        let mesh = MeshParser::new(MeshFormat::Map).parse(&map_file(&[block]), "harbor").unwrap();

        let json = mesh.to_json();
        assert_eq!(json["format"], "map");
        assert_eq!(json["blocks"][0]["vertices"], 3);
        assert_eq!(json["outcome"]["status"], "complete");
        assert!(mesh.to_yaml().contains("format: map"));
    }
}

mod resync_tests {
    use super::*;

    #[test]
    fn test_marker_offset() {
        let mut data = vec![0u8; 0x100];
        let marker = 10 + MARKER_TO_HEADER;
        data[marker..marker + 4].copy_from_slice(&[0xFF; 4]);

        assert_eq!(find_next_block(&data, 0), Some(10));
    }

    #[test]
    fn test_marker_too_early_for_a_header() {
        let mut data = vec![0u8; 0x100];
        data[10..14].copy_from_slice(&[0xFF; 4]);
        data[0x90..0x94].copy_from_slice(&[0xFF; 4]);

        assert_eq!(find_next_block(&data, 0), Some(10 - MARKER_TO_HEADER as isize));
    }

    #[test]
    fn test_no_marker_byte() {
        assert_eq!(find_next_block(&[0u8; 0x200], 0), None);
    }
}

/// Encode a track with `frames` frames; the feature tag is the frame count
/// followed by `tag_tail`
fn track_bytes(name: &str, frames: u32, tag_tail: [u8; 4]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(name.len() as u32).to_le_bytes());
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(&frames.to_le_bytes());
    out.extend_from_slice(&tag_tail);
    for f in 0..frames {
        for v in [f as f32, 0.0, 0.0, 0.0, 0.0, f as f32 * 0.5] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&[0u8; 4]);
    }
    out
}

const TAG: [u8; 4] = [0x11, 0x22, 0x33, 0x44];

mod anim_tests {
    use super::*;

    /// Two tracks, then the file's own name and data that would parse as a
    /// third track if the scan ran past it
    fn clip_with_trailer(stem: &str) -> Vec<u8> {
        let mut data = track_bytes("Bone_A", 2, TAG);
        data.extend(track_bytes("Bone_B", 2, TAG));
        data.extend(track_bytes(stem, 2, TAG));
        data
    }

    #[test]
    fn test_embedded_name_truncates_tracks() {
        let data = clip_with_trailer("walk_cycle");
        let clip = AnimParser::new().parse(&data, "walk_cycle").unwrap();

        assert_eq!(clip.tracks.len(), 2);
        assert_eq!(clip.outcome, DecodeOutcome::Complete);
        assert_eq!(clip.tracks[0].group_name, "Bone_A");
        assert_eq!(clip.tracks[1].frames.len(), 2);
        assert_eq!(clip.tracks[1].frames[1].location, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(clip.tracks[1].frames[1].rotation, Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(clip.feature, Some([2, 0, 0, 0, 0x11, 0x22, 0x33, 0x44]));
    }

    #[test]
    fn test_without_matching_stem_scan_continues() {
        let data = clip_with_trailer("walk_cycle");
        let clip = AnimParser::new().parse(&data, "run_cycle").unwrap();

        assert_eq!(clip.tracks.len(), 3);
        assert_eq!(clip.usable_len, data.len());
        assert_eq!(clip.outcome, DecodeOutcome::Complete);
    }

    #[test]
    fn test_feature_mismatch_stops_scan() {
        let mut data = track_bytes("Bone_A", 2, TAG);
        data.extend(track_bytes("Bone_B", 2, [0, 0, 0, 0]));

        let clip = AnimParser::new().parse(&data, "clip").unwrap();

        assert_eq!(clip.tracks.len(), 1);
        assert!(matches!(
            clip.outcome,
            DecodeOutcome::Stopped {
                phase: ParsePhase::ReadingTracks,
                error: ParseError::FeatureMismatch { .. }
            }
        ));
    }

    #[test]
    fn test_long_name_is_not_a_track() {
        let name = "a".repeat(64);
        let data = track_bytes(&name, 1, TAG);

        let clip = AnimParser::new().parse(&data, "clip").unwrap();
        assert!(clip.tracks.is_empty());
        assert!(matches!(
            clip.outcome,
            DecodeOutcome::Stopped { error: ParseError::MalformedHeader { .. }, .. }
        ));
    }

    #[test]
    fn test_invalid_name_is_not_a_track() {
        let data = track_bytes("9lives", 1, TAG);
        let clip = AnimParser::new().parse(&data, "clip").unwrap();
        assert!(clip.tracks.is_empty());
    }

    #[test]
    fn test_zero_frames_ends_list() {
        let mut data = track_bytes("Bone_A", 1, TAG);
        data.extend(track_bytes("Bone_B", 0, TAG));
        data.extend_from_slice(&[0u8; 16]);

        let clip = AnimParser::new().parse(&data, "clip").unwrap();
        assert_eq!(clip.tracks.len(), 1);
        assert_eq!(clip.outcome, DecodeOutcome::Complete);
    }

    #[test]
    fn test_track_past_end_is_dropped() {
        let mut data = track_bytes("Bone_A", 2, TAG);
        let mut second = track_bytes("Bone_B", 2, TAG);
        second.truncate(second.len() - 1);
        data.extend(second);

        let clip = AnimParser::new().parse(&data, "clip").unwrap();
        assert_eq!(clip.tracks.len(), 1);
        assert!(matches!(
            clip.outcome,
            DecodeOutcome::Stopped { error: ParseError::OutOfBounds { .. }, .. }
        ));
    }

    #[test]
    fn test_duplicate_names_merge() {
        let mut data = track_bytes("Hips", 2, TAG);
        data.extend(track_bytes("Spine", 2, TAG));
        data.extend(track_bytes("Hips", 2, TAG));

        let clip = AnimParser::new().parse(&data, "clip").unwrap();
        let grouped = clip.grouped();

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].group_name, "Hips");
        assert_eq!(grouped[0].frames.len(), 4);
        assert_eq!(clip.total_frames(), 4);
    }
}

mod skel_tests {
    use super::*;
    use pmt_parsers::skel::SKEL_MAGIC;

    fn skel_file(bones: &[(&str, u32)], heads: &[[f32; 3]]) -> Vec<u8> {
        let mut out = SKEL_MAGIC.to_vec();
        for (name, level) in bones {
            out.extend_from_slice(&(name.len() as u32).to_le_bytes());
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(&level.to_le_bytes());
        }
        for head in heads {
            for v in head {
                out.extend_from_slice(&v.to_le_bytes());
            }
            for v in [head[0], head[1] + 0.5, head[2]] {
                out.extend_from_slice(&v.to_le_bytes());
            }
            out.extend_from_slice(&1.0f32.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_siblings_share_root_and_last_child_sets_tail() {
        let data = skel_file(
            &[("root", 1), ("left", 2), ("right", 2)],
            &[[0.0, 0.0, 0.0], [-1.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        );

        let skel = SkelParser::new().parse(&data, "hero").unwrap();

        assert_eq!(skel.outcome, DecodeOutcome::Complete);
        assert_eq!(skel.bones.len(), 3);
        assert_eq!(skel.transforms.len(), 3);
        assert_eq!(skel.tree.roots, vec![0]);
        assert_eq!(skel.tree.bones[1].parent, Some(0));
        assert_eq!(skel.tree.bones[2].parent, Some(0));
        assert_eq!(skel.tree.bones[0].tail, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(skel.transforms[0].end_tag, 1.0);

        let parser = SkelParser::new();
        let roots = parser.roots(&skel);
        assert_eq!(roots.len(), 1);
        assert_eq!(parser.children(&skel, roots[0]).len(), 2);
        assert!(parser.is_leaf(&skel, &skel.tree.bones[1]));
    }

    #[test]
    fn test_truncated_transforms_drop_bones() {
        let mut data = skel_file(
            &[("root", 1), ("spine", 2), ("head", 3)],
            &[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 2.0, 0.0]],
        );
        data.truncate(data.len() - 4);

        let skel = SkelParser::new().parse(&data, "hero").unwrap();

        assert_eq!(skel.bones.len(), 3);
        assert_eq!(skel.tree.bone_count(), 2);
        assert!(matches!(
            skel.outcome,
            DecodeOutcome::Stopped { phase: ParsePhase::ReadingTransforms, .. }
        ));
    }

    #[test]
    fn test_readable_tree() {
        let data = skel_file(
            &[("root", 1), ("spine", 2)],
            &[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        );
        let text = SkelParser::new().parse(&data, "hero").unwrap().to_readable_string();

        assert!(text.contains("  root (level 1)"));
        assert!(text.contains("    spine (level 2)"));
    }

    #[test]
    fn test_parse_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.skel");
        std::fs::write(
            &path,
            skel_file(&[("root", 1)], &[[0.0, 0.0, 0.0]]),
        )
        .unwrap();

        let parser = SkelParser::new();
        assert!(parser.can_parse(&path));
        let skel = parser.parse_file(&path).unwrap();
        assert_eq!(skel.tree.bone_count(), 1);
    }
}

proptest! {
    #[test]
    fn prop_half_special_exponent_is_zero(sign in 0u16..2, mantissa in 0u16..1024) {
        let bits = (sign << 15) | (0x1F << 10) | mantissa;
        prop_assert_eq!(decode_half(&bits.to_le_bytes(), 0), 0.0);
    }

    #[test]
    fn prop_found_block_has_marker(data in proptest::collection::vec(any::<u8>(), 0..512), from in 0usize..600) {
        if let Some(start) = find_next_block(&data, from) {
            let marker = (start + MARKER_TO_HEADER as isize) as usize;
            prop_assert!(marker + 4 < data.len());
            prop_assert_eq!(&data[marker..marker + 4], &[0xFF; 4][..]);
            prop_assert!(marker >= from);
            // Nothing between `from` and the marker is itself a marker
            prop_assert!(data[from..marker].windows(4).all(|w| w != [0xFF; 4]));
        }
    }

    #[test]
    fn prop_no_ff_means_no_block(data in proptest::collection::vec(0u8..0xFF, 0..512)) {
        prop_assert_eq!(find_next_block(&data, 0), None);
    }

    #[test]
    fn prop_parents_are_one_level_up(
        levels in proptest::collection::vec(1u32..5, 1..24),
        coords in proptest::collection::vec(-10.0f32..10.0, 72),
    ) {
        let bones: Vec<Bone> = levels
            .iter()
            .enumerate()
            .map(|(i, &level)| Bone { name: format!("b{i}"), level })
            .collect();
        let transforms: Vec<BoneTransform> = (0..bones.len())
            .map(|i| BoneTransform {
                head: Vec3::new(coords[i * 3], coords[i * 3 + 1], coords[i * 3 + 2]),
                tail: Vec3::ZERO,
                end_tag: 1.0,
            })
            .collect();

        let tree = reconstruct(&bones, &transforms);
        for bone in &tree.bones {
            match bone.parent {
                Some(p) => prop_assert_eq!(tree.bones[p].level + 1, bone.level),
                None => prop_assert!(
                    bone.level <= 1 || !tree.bones.iter().any(|b| b.level + 1 == bone.level)
                ),
            }
        }
    }

    #[test]
    fn prop_decoders_never_panic(data in proptest::collection::vec(any::<u8>(), 0..1024)) {
        for format in MeshFormat::ALL {
            let _ = MeshParser::new(format).parse(&data, "fuzz");
        }
        let _ = AnimParser::new().parse(&data, "fuzz");
        let _ = SkelParser::new().parse(&data, "fuzz");
    }
}
