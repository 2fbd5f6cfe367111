// pmt-parsers/src/batch.rs
//! Parallel decoding of many independent files
//!
//! Each file is read once and decoded on its own rayon task; nothing is shared
//! between tasks.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use crate::anim::{AnimParser, AnimationClip};
use crate::mesh::{MeshFile, MeshFormat, MeshParser};
use crate::skel::{SkelParser, Skeleton};
use crate::traits::{DecodeOutcome, HumanReadable, ParseOptions, Parser};
use crate::{log_parse_complete, log_parse_error, log_parse_start};

/// Which decoder a file needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Mesh(MeshFormat),
    Anim,
    Skel,
}

impl AssetKind {
    /// Pick a decoder from the file extension.
    ///
    /// `.mesh` files carry no layout tag, so the caller supplies one.
    pub fn from_path(path: &Path, mesh_format: MeshFormat) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "mesh" => Some(AssetKind::Mesh(mesh_format)),
            "anim" => Some(AssetKind::Anim),
            "skel" => Some(AssetKind::Skel),
            _ => None,
        }
    }
}

/// Output of any decoder
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedAsset {
    Mesh(MeshFile),
    Anim(AnimationClip),
    Skel(Skeleton),
}

impl DecodedAsset {
    pub fn outcome(&self) -> &DecodeOutcome {
        match self {
            DecodedAsset::Mesh(m) => &m.outcome,
            DecodedAsset::Anim(a) => &a.outcome,
            DecodedAsset::Skel(s) => &s.outcome,
        }
    }

    /// Number of top-level units decoded: blocks, tracks or bones
    pub fn unit_count(&self) -> usize {
        match self {
            DecodedAsset::Mesh(m) => m.blocks.len(),
            DecodedAsset::Anim(a) => a.tracks.len(),
            DecodedAsset::Skel(s) => s.tree.bone_count(),
        }
    }
}

impl HumanReadable for DecodedAsset {
    fn to_readable_string(&self) -> String {
        match self {
            DecodedAsset::Mesh(m) => m.to_readable_string(),
            DecodedAsset::Anim(a) => a.to_readable_string(),
            DecodedAsset::Skel(s) => s.to_readable_string(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            DecodedAsset::Mesh(m) => m.to_json(),
            DecodedAsset::Anim(a) => a.to_json(),
            DecodedAsset::Skel(s) => s.to_json(),
        }
    }
}

/// Decode one file with the decoder for `kind`
pub fn decode_file(
    path: &Path,
    kind: AssetKind,
    options: &ParseOptions,
) -> pmt_core::Result<DecodedAsset> {
    match kind {
        AssetKind::Mesh(format) => MeshParser::new(format)
            .parse_file_with_options(path, options)
            .map(DecodedAsset::Mesh),
        AssetKind::Anim => AnimParser::new()
            .parse_file_with_options(path, options)
            .map(DecodedAsset::Anim),
        AssetKind::Skel => SkelParser::new()
            .parse_file_with_options(path, options)
            .map(DecodedAsset::Skel),
    }
}

/// Result for one file of a batch
#[derive(Debug)]
pub struct BatchItem {
    pub path: PathBuf,
    pub result: pmt_core::Result<DecodedAsset>,
}

/// Counts over a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub complete: usize,
    pub partial: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_items(items: &[BatchItem]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            match &item.result {
                Ok(asset) if asset.outcome().is_complete() => acc.complete += 1,
                Ok(_) => acc.partial += 1,
                Err(_) => acc.failed += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.complete + self.partial + self.failed
    }
}

/// Decode every path in parallel, keeping input order
pub fn decode_batch(
    paths: &[PathBuf],
    mesh_format: MeshFormat,
    options: &ParseOptions,
) -> Vec<BatchItem> {
    paths
        .par_iter()
        .map(|path| {
            let start = Instant::now();
            let result = match AssetKind::from_path(path, mesh_format) {
                Some(kind) => {
                    log_parse_start!(format!("{kind:?}"), path);
                    decode_file(path, kind, options)
                }
                None => Err(pmt_core::Error::UnsupportedFormat {
                    format: path
                        .extension()
                        .map(|e| e.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                }),
            };

            match &result {
                Ok(asset) => {
                    log_parse_complete!(path.display(), start.elapsed(), asset.unit_count());
                }
                Err(e) => {
                    log_parse_error!(path.display(), e);
                }
            }

            BatchItem {
                path: path.clone(),
                result,
            }
        })
        .collect()
}
