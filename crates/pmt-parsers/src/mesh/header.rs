// pmt-parsers/src/mesh/header.rs
//! File-level preambles that precede the first block

use pmt_core::Vec3;

use crate::binary::ByteCursor;
use crate::traits::{ParseError, ParseResult};

/// Prop and map files start with two camera positions
pub const CAMERA_PREAMBLE_LEN: usize = 24;

/// Per-object placement record following the wcm name table
const WCM_PLACEMENT_LEN: usize = 0x18;

/// The two camera positions at the start of a map file
pub fn read_cameras(data: &[u8]) -> ParseResult<[Vec3; 2]> {
    let mut cursor = ByteCursor::new(data);
    let first = cursor.vec3()?;
    let second = cursor.vec3()?;

    tracing::debug!(?first, ?second, "Read camera preamble");
    Ok([first, second])
}

/// Object names from a wcm header and where the first block begins
#[derive(Debug, Clone, PartialEq)]
pub struct NameTable {
    pub names: Vec<String>,
    pub blocks_start: usize,
}

/// Read the wcm dynamic header.
///
/// The object count appears twice, before and after the names; the two must
/// agree. Placement records for every object are skipped.
pub fn read_name_table(data: &[u8]) -> ParseResult<NameTable> {
    let mut cursor = ByteCursor::new(data);

    let count = cursor.u32()?;
    let mut names = Vec::new();
    for i in 0..count {
        let name = cursor
            .prefixed_string()
            .map_err(|e| e.with_context(format!("object name {i}")))?;
        tracing::trace!(index = i, %name, "Read object name");
        names.push(name);
    }

    let count_at = cursor.position();
    let repeated = cursor.u32()?;
    if repeated != count {
        return Err(ParseError::malformed(
            count_at,
            format!("object count {count} does not match repeated count {repeated}"),
        ));
    }

    let placement_len = (count as usize)
        .checked_mul(WCM_PLACEMENT_LEN)
        .ok_or_else(|| ParseError::malformed(count_at, "placement table size overflows"))?;
    cursor.skip(placement_len)?;

    tracing::debug!(
        objects = count,
        blocks_start = %format_args!("{:#x}", cursor.position()),
        "Read name table"
    );

    Ok(NameTable {
        names,
        blocks_start: cursor.position(),
    })
}
