// pmt-parsers/src/anim/mod.rs
//! Animation track decoder for `.anim` files
//!
//! An animation file is a run of named tracks followed by data nobody has
//! decoded yet. Each track is:
//!
//! ```text
//! u32 name length | name | u32 frame count | 4 bytes | frames × 28 bytes
//!                          └──── 8-byte feature tag ─┘
//! ```
//!
//! The feature tag overlaps the frame count. All tracks of one file carry the
//! same tag, so a differing tag means the scan has walked off the track list.
//! Some files also embed their own base name after the tracks; the scan never
//! reads past the 4-byte length prefix in front of that name.

use once_cell::sync::Lazy;
use pmt_core::Vec3;
use regex::Regex;
use serde::Serialize;

use crate::binary::{read_u32_at, ByteCursor};
use crate::logging::instrument_parse;
use crate::traits::{
    DecodeOutcome, HumanReadable, ParseError, ParseOptions, ParsePhase, ParseResult, Parser,
};

/// Bytes per frame: location, rotation, 4 unused bytes
pub const FRAME_LEN: usize = 28;

/// Length of the per-track feature tag
pub const FEATURE_LEN: usize = 8;

/// Track names must be valid scene object identifiers
static TRACK_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid track name pattern"));

pub fn is_valid_track_name(name: &str) -> bool {
    TRACK_NAME.is_match(name)
}

/// One keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    pub location: Vec3,
    pub rotation: Vec3,
}

/// A named run of frames
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationTrack {
    pub group_name: String,
    pub frames: Vec<Frame>,
}

/// Byte range of one track's frames
#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackSpan {
    name: String,
    data_start: usize,
    data_end: usize,
}

/// A decoded `.anim` file
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub tracks: Vec<AnimationTrack>,
    /// Feature tag shared by every track
    pub feature: Option<[u8; FEATURE_LEN]>,
    /// Bytes of the file that may hold tracks
    pub usable_len: usize,
    pub outcome: DecodeOutcome,
}

impl AnimationClip {
    /// Longest frame run of any merged group; the host timeline's end
    pub fn total_frames(&self) -> usize {
        self.grouped()
            .iter()
            .map(|t| t.frames.len())
            .max()
            .unwrap_or(0)
    }

    /// Tracks sharing a name merged into one, in first-seen order
    pub fn grouped(&self) -> Vec<AnimationTrack> {
        let mut groups: Vec<AnimationTrack> = Vec::new();
        for track in &self.tracks {
            match groups.iter_mut().find(|g| g.group_name == track.group_name) {
                Some(group) => group.frames.extend_from_slice(&track.frames),
                None => groups.push(track.clone()),
            }
        }
        groups
    }

    pub fn frame_count(&self) -> usize {
        self.tracks.iter().map(|t| t.frames.len()).sum()
    }
}

/// Where the track list must end.
///
/// If the file's base name appears in the buffer, everything from the length
/// prefix in front of it onward is trailing data.
pub fn usable_len(data: &[u8], stem: &str) -> usize {
    let needle = stem.as_bytes();
    if needle.is_empty() || needle.len() > data.len() {
        return data.len();
    }

    match data.windows(needle.len()).position(|w| w == needle) {
        Some(found) => {
            tracing::debug!(
                stem,
                at = %format_args!("{found:#x}"),
                "Embedded file name truncates track data"
            );
            found.saturating_sub(4)
        }
        None => data.len(),
    }
}

/// Result of reading one track header
enum TrackStep {
    Track(TrackSpan, [u8; FEATURE_LEN]),
    /// A zero frame count ends the track list
    End,
}

fn read_track_header(
    data: &[u8],
    pos: usize,
    usable: usize,
    reference: Option<&[u8; FEATURE_LEN]>,
    options: &ParseOptions,
) -> ParseResult<TrackStep> {
    let name_len = read_u32_at(data, pos)? as usize;
    if name_len > options.max_track_name_len {
        return Err(ParseError::malformed(
            pos,
            format!("track name length {name_len} exceeds {}", options.max_track_name_len),
        ));
    }

    let mut cursor = ByteCursor::at(data, pos + 4);
    let name = cursor.string(name_len)?;
    if !is_valid_track_name(&name) {
        return Err(ParseError::malformed(pos + 4, format!("'{name}' is not a valid track name")));
    }

    let count_at = cursor.position();
    let frame_count = cursor.peek_u32()? as usize;
    if frame_count == 0 {
        return Ok(TrackStep::End);
    }

    let feature: [u8; FEATURE_LEN] = cursor.array()?;
    if let Some(expected) = reference {
        if *expected != feature {
            return Err(ParseError::FeatureMismatch {
                offset: count_at,
                expected: *expected,
                found: feature,
            });
        }
    }

    let data_start = cursor.position();
    let data_end = frame_count
        .checked_mul(FRAME_LEN)
        .and_then(|len| len.checked_add(data_start))
        .filter(|&end| end <= usable)
        .ok_or(ParseError::OutOfBounds {
            offset: data_start,
            requested: frame_count.saturating_mul(FRAME_LEN),
            available: usable.saturating_sub(data_start),
        })?;

    tracing::trace!(
        %name,
        frames = frame_count,
        start = %format_args!("{data_start:#x}"),
        end = %format_args!("{data_end:#x}"),
        "Found track"
    );

    Ok(TrackStep::Track(TrackSpan { name, data_start, data_end }, feature))
}

/// Accumulated state of a track scan
#[derive(Debug, Default)]
struct TrackScan {
    spans: Vec<TrackSpan>,
    feature: Option<[u8; FEATURE_LEN]>,
}

fn scan_tracks(data: &[u8], usable: usize, options: &ParseOptions) -> (TrackScan, DecodeOutcome) {
    let mut scan = TrackScan::default();
    let mut pos = 0;

    loop {
        match read_track_header(data, pos, usable, scan.feature.as_ref(), options) {
            Ok(TrackStep::End) => return (scan, DecodeOutcome::Complete),
            Ok(TrackStep::Track(span, feature)) => {
                scan.feature.get_or_insert(feature);
                pos = span.data_end;
                scan.spans.push(span);
                if pos == usable {
                    return (scan, DecodeOutcome::Complete);
                }
            }
            Err(error) => {
                tracing::debug!(
                    tracks = scan.spans.len(),
                    at = %format_args!("{pos:#x}"),
                    %error,
                    "Track scan stopped"
                );
                return (scan, DecodeOutcome::stopped(ParsePhase::ReadingTracks, error));
            }
        }
    }
}

/// Frames of one span; a trailing partial frame is dropped
fn read_frames(data: &[u8], span: &TrackSpan) -> Vec<Frame> {
    data.get(span.data_start..span.data_end)
        .unwrap_or_default()
        .chunks_exact(FRAME_LEN)
        .filter_map(|raw| {
            let mut cursor = ByteCursor::new(raw);
            Some(Frame {
                location: cursor.vec3().ok()?,
                rotation: cursor.vec3().ok()?,
            })
        })
        .collect()
}

/// Decoder for `.anim` files
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimParser;

impl AnimParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for AnimParser {
    type Output = AnimationClip;

    fn extensions(&self) -> &[&str] {
        &["anim"]
    }

    fn name(&self) -> &str {
        "Animation Track Decoder"
    }

    fn parse_with_options(
        &self,
        data: &[u8],
        stem: &str,
        options: &ParseOptions,
    ) -> ParseResult<Self::Output> {
        instrument_parse(self.name(), || {
            let usable = usable_len(data, stem);
            let (scan, outcome) = scan_tracks(data, usable, options);

            let tracks: Vec<AnimationTrack> = scan
                .spans
                .iter()
                .map(|span| AnimationTrack {
                    group_name: span.name.clone(),
                    frames: read_frames(data, span),
                })
                .collect();

            if scan.spans.is_empty() {
                tracing::warn!(stem, %outcome, "No animation tracks found");
            }
            tracing::info!(stem, tracks = tracks.len(), usable, "Decoded animation");

            Ok(AnimationClip {
                tracks,
                feature: scan.feature,
                usable_len: usable,
                outcome,
            })
        })
    }
}

impl HumanReadable for AnimationClip {
    fn to_readable_string(&self) -> String {
        let mut out = format!(
            "Animation: {} track(s), {} frames on the timeline ({})\n",
            self.tracks.len(),
            self.total_frames(),
            self.outcome
        );
        if let Some(feature) = &self.feature {
            out.push_str(&format!("  feature: {}\n", hex_tag(feature)));
        }
        for track in &self.tracks {
            out.push_str(&format!("  {}: {} frames\n", track.group_name, track.frames.len()));
        }
        out
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "feature": self.feature.as_ref().map(hex_tag),
            "usable_len": self.usable_len,
            "total_frames": self.total_frames(),
            "tracks": self.tracks.iter().map(|t| serde_json::json!({
                "name": t.group_name,
                "frames": t.frames.len(),
            })).collect::<Vec<_>>(),
            "outcome": self.outcome.to_json(),
        })
    }
}

fn hex_tag(tag: &[u8; FEATURE_LEN]) -> String {
    tag.iter().map(|b| format!("{b:02x}")).collect()
}
