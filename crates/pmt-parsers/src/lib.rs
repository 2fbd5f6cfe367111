//! pmt-parsers
//!
//! Decoders for undocumented, reverse-engineered game asset formats. Every
//! layout here was inferred from byte inspection, so each decoder returns
//! whatever it managed to read together with a [`DecodeOutcome`] saying how
//! and where it stopped.
//!
//! # Supported Formats
//!
//! | Format | Extension | Description |
//! |--------|-----------|-------------|
//! | Prop   | `.mesh`   | Static prop geometry, contiguous blocks |
//! | Map    | `.mesh`   | Map geometry with interleaved unparsed payloads |
//! | WCM    | `.mesh`   | Weapon/character geometry with named blocks |
//! | ANIM   | `.anim`   | Per-object location/rotation tracks |
//! | SKEL   | `.skel`   | Bone names, depth levels and rest transforms |
//!
//! # Example
//!
//! ```rust,ignore
//! use pmt_parsers::{MeshFormat, MeshParser, Parser};
//!
//! let parser = MeshParser::new(MeshFormat::Map);
//! let mesh = parser.parse_file(Path::new("harbor.mesh"))?;
//!
//! println!("Decoded {} blocks ({})", mesh.blocks.len(), mesh.outcome);
//! ```

pub mod anim;
pub mod batch;
pub mod binary;
pub mod logging;
pub mod mesh;
pub mod skel;
pub mod traits;

// Re-export main types
pub use traits::{
    file_stem, DecodeOutcome, HierarchicalParser, HumanReadable, ParseError, ParseOptions,
    ParsePhase, ParseResult, Parser,
};

pub use anim::{AnimParser, AnimationClip, AnimationTrack, Frame};
pub use batch::{decode_batch, decode_file, AssetKind, BatchItem, BatchSummary, DecodedAsset};
pub use binary::{decode_half, ByteCursor};
pub use mesh::{find_next_block, MeshBlock, MeshFile, MeshFormat, MeshParser};
pub use skel::{
    reconstruct, Bone, BoneTransform, IkConstraint, SkelParser, Skeleton, SkeletonBone,
    SkeletonTree,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
