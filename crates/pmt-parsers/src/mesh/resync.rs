// pmt-parsers/src/mesh/resync.rs
//! Recovering the next block header after an unparsed region
//!
//! Map files interleave mesh blocks with material, texture and shader payloads
//! that are never described. The first vertex record of every block ends with
//! four `0xFF` bytes, so the next header is found by scanning for that run and
//! stepping back a fixed distance.
//!
//! ```text
//!  header (0x1D)    first vertex record          marker
//! ├──────────────┼──────────────────────────────┼─────────────┤
//! ^ block start                                  ^ start + 0x4D
//! ```
//!
//! This is a heuristic: unrelated data containing the same run will produce a
//! false match, which the block decoder then usually rejects on its stride
//! check.

use byteorder::{ByteOrder, LittleEndian};

use super::block::HEADER_LEN;

/// Distance from a block's header to the end-of-first-record marker
pub const MARKER_TO_HEADER: usize = 0x30 + HEADER_LEN;

const MARKER: u32 = 0xFFFF_FFFF;

/// Find the start of the next block header at or after `from`.
///
/// The answer always comes from the first marker found. A marker closer than
/// [`MARKER_TO_HEADER`] to the start of the buffer yields a negative start,
/// which no block can have; callers treat it as a failed resync.
pub fn find_next_block(data: &[u8], from: usize) -> Option<isize> {
    let mut pos = from;

    while pos < data.len() {
        if data[pos] == 0xFF {
            // The scanner insists on at least one byte after the marker.
            if pos + 4 >= data.len() {
                tracing::trace!(offset = %format_args!("{pos:#x}"), "Marker candidate too close to end");
                return None;
            }

            if LittleEndian::read_u32(&data[pos..pos + 4]) == MARKER {
                let start = pos as isize - MARKER_TO_HEADER as isize;
                tracing::debug!(
                    marker = %format_args!("{pos:#x}"),
                    start,
                    "Found next block marker"
                );
                return Some(start);
            }
        }
        pos += 1;
    }

    tracing::debug!(from = %format_args!("{from:#x}"), "No block marker before end of data");
    None
}
