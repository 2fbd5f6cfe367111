// pmt-parsers/src/traits.rs
//! Core traits defining the parser interface for all asset formats.
//!
//! Every decoder in this crate works on a complete in-memory byte buffer and
//! returns plain owned data. Failures inside a block, track or bone are not
//! errors at this level: they are recorded as a [`DecodeOutcome`] next to
//! whatever was decoded before the failure.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during decoding
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Read out of bounds at offset 0x{offset:X}: requested {requested} bytes, available {available}")]
    OutOfBounds {
        offset: usize,
        requested: usize,
        available: usize,
    },

    #[error("Malformed header at offset 0x{offset:X}: {message}")]
    MalformedHeader { offset: usize, message: String },

    #[error("Feature tag mismatch at offset 0x{offset:X}: expected {expected:02X?}, found {found:02X?}")]
    FeatureMismatch {
        offset: usize,
        expected: [u8; 8],
        found: [u8; 8],
    },

    #[error("No block marker found after offset 0x{offset:X}")]
    UnrecognizedTrailingData { offset: usize },

    #[error("Invalid magic bytes: expected {expected:02X?}, found {found:02X?}")]
    InvalidMagic { expected: Vec<u8>, found: Vec<u8> },

    #[error("Nested error in {context}: {source}")]
    Nested {
        context: String,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Wrap this error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ParseError::Nested {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a header sanity-check failure
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        ParseError::MalformedHeader {
            offset,
            message: message.into(),
        }
    }

    /// The innermost error, with all context layers removed
    pub fn root_cause(&self) -> &ParseError {
        match self {
            ParseError::Nested { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<ParseError> for pmt_core::Error {
    fn from(err: ParseError) -> Self {
        pmt_core::Error::Decode(Box::new(err))
    }
}

/// Result type alias for decoding operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Phases of a decode, used to report where a decode stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsePhase {
    /// Searching for the next block after an unparsed region
    Scanning,
    /// Reading a block or file header
    ReadingHeader,
    /// Reading per-vertex records
    ParsingVertices,
    /// Reading the face index block
    ParsingFaces,
    /// Walking animation track headers
    ReadingTracks,
    /// Reading the skeleton name/level list
    ReadingBones,
    /// Reading per-bone transforms
    ReadingTransforms,
}

impl std::fmt::Display for ParsePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ParsePhase::Scanning => "scanning",
            ParsePhase::ReadingHeader => "reading header",
            ParsePhase::ParsingVertices => "parsing vertices",
            ParsePhase::ParsingFaces => "parsing faces",
            ParsePhase::ReadingTracks => "reading tracks",
            ParsePhase::ReadingBones => "reading bones",
            ParsePhase::ReadingTransforms => "reading transforms",
        };
        f.write_str(name)
    }
}

/// How a decode ended
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// The format's own termination condition was met
    Complete,
    /// Decoding stopped early; everything before the failure was kept
    Stopped { phase: ParsePhase, error: ParseError },
}

impl DecodeOutcome {
    pub fn stopped(phase: ParsePhase, error: ParseError) -> Self {
        DecodeOutcome::Stopped { phase, error }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, DecodeOutcome::Complete)
    }

    /// The error that stopped the decode, if any
    pub fn error(&self) -> Option<&ParseError> {
        match self {
            DecodeOutcome::Complete => None,
            DecodeOutcome::Stopped { error, .. } => Some(error),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            DecodeOutcome::Complete => serde_json::json!({ "status": "complete" }),
            DecodeOutcome::Stopped { phase, error } => serde_json::json!({
                "status": "stopped",
                "phase": phase.to_string(),
                "error": error.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for DecodeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeOutcome::Complete => f.write_str("complete"),
            DecodeOutcome::Stopped { phase, error } => {
                write!(f, "stopped while {}: {}", phase, error)
            }
        }
    }
}

/// Configuration options for decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Store UVs as `(u, 1 - v)`
    pub flip_uv_v: bool,
    /// Fail a mesh block whose faces reference missing vertices
    pub validate_face_indices: bool,
    /// Longest accepted animation track name
    pub max_track_name_len: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            flip_uv_v: true,
            validate_face_indices: true,
            max_track_name_len: 63,
        }
    }
}

impl ParseOptions {
    /// Load options from a JSON document; missing fields take their defaults
    pub fn from_json(text: &str) -> pmt_core::Result<Self> {
        serde_json::from_str(text).map_err(|e| pmt_core::Error::invalid_config(e.to_string()))
    }

    /// Load options from a JSON file on disk
    pub fn from_json_file(path: &Path) -> pmt_core::Result<Self> {
        let text = read_file(path)?;
        let text = String::from_utf8(text)
            .map_err(|e| pmt_core::Error::invalid_config(e.to_string()))?;
        Self::from_json(&text)
    }
}

fn read_file(path: &Path) -> pmt_core::Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            pmt_core::Error::FileNotFound(path.to_path_buf())
        } else {
            pmt_core::Error::Io(e)
        }
    })
}

/// Core trait for all asset decoders
///
/// Implementors decode one whole file held in memory. The caller also passes
/// the file's base name, which some formats embed in their own trailing data.
pub trait Parser: Send + Sync {
    /// The decoded output type
    type Output: Send + Sync;

    /// Returns the file extensions this parser handles (e.g., ["mesh"])
    fn extensions(&self) -> &[&str];

    /// Returns the magic bytes that identify this file type (if applicable)
    fn magic_bytes(&self) -> Option<&[u8]> {
        None
    }

    /// Returns a human-readable name for this parser
    fn name(&self) -> &str;

    /// Decode a buffer with custom options
    fn parse_with_options(
        &self,
        data: &[u8],
        stem: &str,
        options: &ParseOptions,
    ) -> ParseResult<Self::Output>;

    /// Decode a buffer with default options
    fn parse(&self, data: &[u8], stem: &str) -> ParseResult<Self::Output> {
        self.parse_with_options(data, stem, &ParseOptions::default())
    }

    /// Read a file wholesale and decode it
    fn parse_file(&self, path: &Path) -> pmt_core::Result<Self::Output> {
        self.parse_file_with_options(path, &ParseOptions::default())
    }

    /// Read a file wholesale and decode it with custom options
    fn parse_file_with_options(
        &self,
        path: &Path,
        options: &ParseOptions,
    ) -> pmt_core::Result<Self::Output> {
        let data = read_file(path)?;
        let stem = file_stem(path);

        self.parse_with_options(&data, &stem, options)
            .map_err(|e| pmt_core::Error::from(e).with_context(path.display().to_string()))
    }

    /// Check if this parser can handle the given file
    fn can_parse(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy().to_lowercase();
            if self.extensions().iter().any(|e| e.to_lowercase() == ext_str) {
                return true;
            }
        }

        if let Some(magic) = self.magic_bytes() {
            if let Ok(data) = std::fs::read(path) {
                return data.starts_with(magic);
            }
        }

        false
    }
}

/// File name without directory or extension
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Trait for parsers that produce hierarchical/tree structures
pub trait HierarchicalParser: Parser {
    /// Node type in the hierarchy
    type Node: Send;

    /// Get the root node(s) of the parsed structure
    fn roots<'a>(&self, parsed: &'a Self::Output) -> Vec<&'a Self::Node>;

    /// Get children of a node
    fn children<'a>(&self, parsed: &'a Self::Output, node: &Self::Node) -> Vec<&'a Self::Node>;

    /// Check if a node is a leaf (no children)
    fn is_leaf(&self, parsed: &Self::Output, node: &Self::Node) -> bool {
        self.children(parsed, node).is_empty()
    }
}

/// Trait for converting decoded data to human-readable formats
pub trait HumanReadable {
    /// Convert to a human-readable string representation
    fn to_readable_string(&self) -> String;

    /// Convert to formatted JSON
    fn to_json(&self) -> serde_json::Value;

    /// Convert to formatted YAML (falls back to the readable string)
    fn to_yaml(&self) -> String {
        serde_yaml::to_string(&self.to_json()).unwrap_or_else(|_| self.to_readable_string())
    }
}
