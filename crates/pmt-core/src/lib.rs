//! PMT Core Library
//!
//! This crate provides the plain value types and the unified error type
//! shared by the decoding engine, the exporters and the command line tool.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
