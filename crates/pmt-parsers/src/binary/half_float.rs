// pmt-parsers/src/binary/half_float.rs
//! Half-precision float decoding for normals and UVs

use half::f16;

use super::cursor::read_u16_at;

/// All-ones exponent: infinities and NaNs, which asset data never contains
const EXPONENT_SPECIAL: u16 = 0x1F;

/// Decode the little-endian half float at `offset`.
///
/// Special values (exponent 31) decode as `0.0`, and so does a read past the
/// end of `bytes`.
pub fn decode_half(bytes: &[u8], offset: usize) -> f32 {
    let Ok(bits) = read_u16_at(bytes, offset) else {
        return 0.0;
    };

    if (bits >> 10) & EXPONENT_SPECIAL == EXPONENT_SPECIAL {
        return 0.0;
    }

    f16::from_bits(bits).to_f32()
}
