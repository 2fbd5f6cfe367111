// pmt-parsers/src/binary/mod.rs
//! Low-level readers shared by every decoder
//!
//! All multi-byte values in these formats are little-endian.

mod cursor;
mod half_float;

pub use cursor::{read_f32_at, read_u16_at, read_u32_at, read_vec3_at, ByteCursor};
pub use half_float::decode_half;
