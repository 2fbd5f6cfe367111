// pmt-parsers/src/binary/cursor.rs
//! Bounds-checked little-endian field reader

use byteorder::{ByteOrder, LittleEndian};
use pmt_core::Vec3;

use crate::traits::{ParseError, ParseResult};

/// Borrow `len` bytes at `offset`, or report how far short the buffer is
fn slice_at(data: &[u8], offset: usize, len: usize) -> ParseResult<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(ParseError::OutOfBounds {
            offset,
            requested: len,
            available: data.len().saturating_sub(offset),
        })
}

pub fn read_u16_at(data: &[u8], offset: usize) -> ParseResult<u16> {
    slice_at(data, offset, 2).map(LittleEndian::read_u16)
}

pub fn read_u32_at(data: &[u8], offset: usize) -> ParseResult<u32> {
    slice_at(data, offset, 4).map(LittleEndian::read_u32)
}

pub fn read_f32_at(data: &[u8], offset: usize) -> ParseResult<f32> {
    slice_at(data, offset, 4).map(LittleEndian::read_f32)
}

pub fn read_vec3_at(data: &[u8], offset: usize) -> ParseResult<Vec3> {
    let raw = slice_at(data, offset, 12)?;
    Ok(Vec3::new(
        LittleEndian::read_f32(&raw[0..4]),
        LittleEndian::read_f32(&raw[4..8]),
        LittleEndian::read_f32(&raw[8..12]),
    ))
}

/// Sequential reader over a borrowed buffer.
///
/// A failed read leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Start reading at an absolute offset
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Advance without reading; fails if that would pass the end
    pub fn skip(&mut self, n: usize) -> ParseResult<()> {
        self.bytes(n).map(|_| ())
    }

    pub fn bytes(&mut self, n: usize) -> ParseResult<&'a [u8]> {
        let out = slice_at(self.data, self.pos, n)?;
        self.pos += n;
        Ok(out)
    }

    pub fn u16(&mut self) -> ParseResult<u16> {
        self.bytes(2).map(LittleEndian::read_u16)
    }

    pub fn u32(&mut self) -> ParseResult<u32> {
        self.bytes(4).map(LittleEndian::read_u32)
    }

    pub fn f32(&mut self) -> ParseResult<f32> {
        self.bytes(4).map(LittleEndian::read_f32)
    }

    pub fn vec3(&mut self) -> ParseResult<Vec3> {
        let v = read_vec3_at(self.data, self.pos)?;
        self.pos += 12;
        Ok(v)
    }

    /// Fixed-size byte array
    pub fn array<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        let raw = self.bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(raw);
        Ok(out)
    }

    /// `len` raw bytes decoded as UTF-8
    pub fn string(&mut self, len: usize) -> ParseResult<String> {
        let start = self.pos;
        let raw = slice_at(self.data, start, len)?;
        let text = std::str::from_utf8(raw)
            .map_err(|e| ParseError::malformed(start, format!("invalid UTF-8 in name: {e}")))?;
        self.pos += len;
        Ok(text.to_owned())
    }

    /// `u32` length prefix followed by that many UTF-8 bytes
    pub fn prefixed_string(&mut self) -> ParseResult<String> {
        let start = self.pos;
        let len = self.u32()? as usize;
        self.string(len).inspect_err(|_| self.pos = start)
    }

    pub fn peek_u32(&self) -> ParseResult<u32> {
        read_u32_at(self.data, self.pos)
    }

    /// Byte at `pos + ahead` without moving
    pub fn peek_u8(&self, ahead: usize) -> ParseResult<u8> {
        slice_at(self.data, self.pos.saturating_add(ahead), 1).map(|b| b[0])
    }
}
