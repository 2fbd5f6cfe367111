// pmt-parsers/src/mesh/mod.rs
//! Mesh decoder for the three `.mesh` layouts
//!
//! The layouts share a block structure but carry no tag saying which one a
//! file uses, so the caller picks the [`MeshFormat`].
//!
//! # Block Structure
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Header (0x1D bytes)                                         │
//! │    +0x00 object count   +0x04 face groups   +0x08 matrices   │
//! │    +0x19 vertex section size                                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Vertex records (matrices × stride)                          │
//! │    +0x00 position f32×3   +0x0C normal f16×3                 │
//! │    UV f16×2 at a layout-specific distance from record end    │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Face section size (u32) + index slots (u16 in 4-byte slots) │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Layout | Preamble                 | Between blocks              |
//! |--------|--------------------------|-----------------------------|
//! | prop   | 24 bytes, ignored        | nothing                     |
//! | map    | two camera positions     | unparsed payload, rescanned |
//! | wcm    | object name table        | nothing                     |

mod block;
mod header;
mod resync;

pub use block::{MeshBlock, HEADER_LEN};
pub use header::{read_cameras, read_name_table, NameTable, CAMERA_PREAMBLE_LEN};
pub use resync::{find_next_block, MARKER_TO_HEADER};

use std::fmt;
use std::str::FromStr;

use pmt_core::{BoundingBox, Vec3};
use serde::{Deserialize, Serialize};

use crate::logging::instrument_parse;
use crate::traits::{
    DecodeOutcome, HumanReadable, ParseError, ParseOptions, ParsePhase, ParseResult, Parser,
};

/// Vertex record size for the prop and map layouts
pub const FIXED_STRIDE: usize = 52;

/// Smallest wcm record that still holds a position
const MIN_WCM_STRIDE: usize = 12;

/// Which `.mesh` layout a file uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshFormat {
    /// Static props: contiguous blocks
    Prop,
    /// Map geometry: blocks separated by unparsed payloads
    Map,
    /// Weapons and characters: named blocks
    Wcm,
}

impl MeshFormat {
    pub const ALL: [MeshFormat; 3] = [MeshFormat::Prop, MeshFormat::Map, MeshFormat::Wcm];

    /// Stride a block must have, if the layout fixes one
    pub fn expected_stride(self) -> Option<usize> {
        match self {
            MeshFormat::Prop | MeshFormat::Map => Some(FIXED_STRIDE),
            MeshFormat::Wcm => None,
        }
    }

    pub fn min_stride(self) -> usize {
        self.expected_stride().unwrap_or(MIN_WCM_STRIDE)
    }

    /// Offset of the UV pair inside a record of `stride` bytes
    pub fn uv_offset(self, stride: usize) -> usize {
        match self {
            MeshFormat::Map => stride.saturating_sub(0x10),
            // TODO: unverified for coin props, compare against a reference export
            MeshFormat::Prop => stride.saturating_sub(0x0c),
            MeshFormat::Wcm => stride.saturating_sub(0x08),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MeshFormat::Prop => "prop",
            MeshFormat::Map => "map",
            MeshFormat::Wcm => "wcm",
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeshFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prop" => Ok(MeshFormat::Prop),
            "map" => Ok(MeshFormat::Map),
            "wcm" => Ok(MeshFormat::Wcm),
            other => Err(format!("unknown mesh format '{other}' (expected prop, map or wcm)")),
        }
    }
}

/// A decoded `.mesh` file
#[derive(Debug, Clone, PartialEq)]
pub struct MeshFile {
    pub format: MeshFormat,
    /// Camera positions from a map preamble
    pub cameras: Option<[Vec3; 2]>,
    /// Object names from a wcm name table
    pub names: Vec<String>,
    pub blocks: Vec<MeshBlock>,
    pub outcome: DecodeOutcome,
}

impl MeshFile {
    /// Blocks the first header says the file holds
    pub fn expected_blocks(&self) -> Option<usize> {
        self.blocks.first().map(|b| expected_iterations(b.object_count))
    }

    pub fn vertex_count(&self) -> usize {
        self.blocks.iter().map(MeshBlock::vertex_count).sum()
    }

    pub fn face_count(&self) -> usize {
        self.blocks.iter().map(MeshBlock::face_count).sum()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let points: Vec<Vec3> = self
            .blocks
            .iter()
            .flat_map(|b| b.vertices.iter().copied())
            .collect();
        BoundingBox::from_points(&points)
    }
}

/// The first header's object count is one more than the blocks to read
fn expected_iterations(object_count: u32) -> usize {
    (object_count as usize).saturating_sub(1)
}

/// Walk blocks from `start` until the object count is satisfied or a block fails
fn walk_blocks(
    data: &[u8],
    mut start: usize,
    format: MeshFormat,
    names: Option<&[String]>,
    options: &ParseOptions,
) -> (Vec<MeshBlock>, DecodeOutcome) {
    let mut blocks: Vec<MeshBlock> = Vec::new();

    loop {
        let name = match names {
            Some(names) => match names.get(blocks.len()) {
                Some(name) => Some(name.clone()),
                None => return (blocks, DecodeOutcome::Complete),
            },
            None => None,
        };

        let (mut block, end) = match block::decode_block(data, start, format, options) {
            Ok(decoded) => decoded,
            Err((phase, error)) => {
                tracing::warn!(
                    %format,
                    block = blocks.len(),
                    %phase,
                    %error,
                    "Mesh decode stopped early"
                );
                return (blocks, DecodeOutcome::stopped(phase, error));
            }
        };
        block.name = name;
        blocks.push(block);

        if blocks.len() >= expected_iterations(blocks[0].object_count) {
            return (blocks, DecodeOutcome::Complete);
        }

        start = match format {
            MeshFormat::Map => match find_next_block(data, end)
                .and_then(|next| usize::try_from(next).ok())
            {
                Some(next) if next > start => next,
                _ => {
                    let error = ParseError::UnrecognizedTrailingData { offset: end };
                    tracing::warn!(%format, blocks = blocks.len(), %error, "Mesh decode stopped early");
                    return (blocks, DecodeOutcome::stopped(ParsePhase::Scanning, error));
                }
            },
            MeshFormat::Prop | MeshFormat::Wcm => end,
        };
    }
}

/// Decoder for one `.mesh` layout
#[derive(Debug, Clone, Copy)]
pub struct MeshParser {
    format: MeshFormat,
}

impl MeshParser {
    pub fn new(format: MeshFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> MeshFormat {
        self.format
    }

    fn decode(&self, data: &[u8], options: &ParseOptions) -> ParseResult<MeshFile> {
        let mut file = MeshFile {
            format: self.format,
            cameras: None,
            names: Vec::new(),
            blocks: Vec::new(),
            outcome: DecodeOutcome::Complete,
        };

        let (blocks, outcome) = match self.format {
            MeshFormat::Prop => walk_blocks(data, CAMERA_PREAMBLE_LEN, self.format, None, options),
            MeshFormat::Map => {
                let cameras =
                    read_cameras(data).map_err(|e| e.with_context("map camera preamble"))?;
                file.cameras = Some(cameras);
                walk_blocks(data, CAMERA_PREAMBLE_LEN, self.format, None, options)
            }
            MeshFormat::Wcm => {
                let table = read_name_table(data).map_err(|e| e.with_context("wcm name table"))?;
                let walked =
                    walk_blocks(data, table.blocks_start, self.format, Some(&table.names), options);
                file.names = table.names;
                walked
            }
        };

        file.blocks = blocks;
        file.outcome = outcome;
        Ok(file)
    }
}

impl Default for MeshParser {
    fn default() -> Self {
        Self::new(MeshFormat::Prop)
    }
}

impl Parser for MeshParser {
    type Output = MeshFile;

    fn extensions(&self) -> &[&str] {
        &["mesh"]
    }

    fn name(&self) -> &str {
        match self.format {
            MeshFormat::Prop => "Prop Mesh Decoder",
            MeshFormat::Map => "Map Mesh Decoder",
            MeshFormat::Wcm => "Weapon/Character Mesh Decoder",
        }
    }

    fn parse_with_options(
        &self,
        data: &[u8],
        stem: &str,
        options: &ParseOptions,
    ) -> ParseResult<Self::Output> {
        instrument_parse(self.name(), || {
            let file = self.decode(data, options)?;
            tracing::info!(
                stem,
                format = %self.format,
                blocks = file.blocks.len(),
                expected = ?file.expected_blocks(),
                vertices = file.vertex_count(),
                faces = file.face_count(),
                "Decoded mesh"
            );
            Ok(file)
        })
    }
}

impl HumanReadable for MeshFile {
    fn to_readable_string(&self) -> String {
        let mut out = format!(
            "{} mesh: {} block(s), {} vertices, {} faces ({})\n",
            self.format,
            self.blocks.len(),
            self.vertex_count(),
            self.face_count(),
            self.outcome
        );
        if let Some([a, b]) = &self.cameras {
            out.push_str(&format!(
                "  cameras: ({}, {}, {}) ({}, {}, {})\n",
                a.x, a.y, a.z, b.x, b.y, b.z
            ));
        }
        for (i, block) in self.blocks.iter().enumerate() {
            out.push_str(&format!(
                "  [{i}] {}: {} vertices, {} faces, stride {}\n",
                block.name.as_deref().unwrap_or("-"),
                block.vertex_count(),
                block.face_count(),
                block.stride()
            ));
        }
        out
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "format": self.format,
            "cameras": self.cameras,
            "names": self.names,
            "blocks": self.blocks.iter().map(|b| serde_json::json!({
                "name": b.name,
                "object_count": b.object_count,
                "face_group_count": b.face_group_count,
                "matrix_count": b.matrix_count,
                "byte_size": b.byte_size,
                "face_byte_size": b.face_byte_size,
                "vertices": b.vertex_count(),
                "faces": b.face_count(),
                "bounds": BoundingBox::from_points(&b.vertices),
            })).collect::<Vec<_>>(),
            "outcome": self.outcome.to_json(),
        })
    }
}
