// pmt-parsers/src/mesh/block.rs
//! Decoding of a single mesh block: header, vertex section and face section

use pmt_core::{Vec2, Vec3};
use serde::Serialize;

use crate::binary::{decode_half, read_u16_at, read_u32_at, read_vec3_at, ByteCursor};
use crate::traits::{ParseError, ParseOptions, ParsePhase, ParseResult};

use super::MeshFormat;

/// Size of the fixed header in front of every block
pub const HEADER_LEN: usize = 0x1D;

const OBJECT_COUNT_AT: usize = 0x00;
const FACE_GROUP_COUNT_AT: usize = 0x04;
const MATRIX_COUNT_AT: usize = 0x08;
const BYTE_SIZE_AT: usize = 0x19;

const NORMAL_AT: usize = 0x0c;

/// Face indices live in the first two bytes of 4-byte slots, three slots per face
const FACE_STRIDE: usize = 12;
const FACE_SLOT: usize = 4;
const FACE_READ_LEN: usize = 2 * FACE_SLOT + 2;

/// One sub-object's geometry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshBlock {
    /// Object count from the header; only meaningful on the first block
    pub object_count: u32,
    pub face_group_count: u32,
    /// Number of vertex records
    pub matrix_count: u32,
    /// Size of the vertex section in bytes
    pub byte_size: u32,
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub faces: Vec<[u16; 3]>,
    /// Declared size of the face section in bytes
    pub face_byte_size: u32,
    /// Object name, for formats that carry a name table
    pub name: Option<String>,
}

impl MeshBlock {
    /// Bytes per vertex record
    pub fn stride(&self) -> usize {
        if self.matrix_count == 0 {
            0
        } else {
            (self.byte_size / self.matrix_count) as usize
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Why a block could not be decoded
pub(crate) type BlockStop = (ParsePhase, ParseError);

#[derive(Debug, Clone, Copy)]
struct BlockHeader {
    object_count: u32,
    face_group_count: u32,
    matrix_count: u32,
    byte_size: u32,
}

fn read_header(data: &[u8], start: usize) -> ParseResult<BlockHeader> {
    Ok(BlockHeader {
        object_count: read_u32_at(data, start + OBJECT_COUNT_AT)?,
        face_group_count: read_u32_at(data, start + FACE_GROUP_COUNT_AT)?,
        matrix_count: read_u32_at(data, start + MATRIX_COUNT_AT)?,
        byte_size: read_u32_at(data, start + BYTE_SIZE_AT)?,
    })
}

fn vertex_stride(header: &BlockHeader, format: MeshFormat, start: usize) -> ParseResult<usize> {
    if header.matrix_count == 0 {
        return Err(ParseError::malformed(start + MATRIX_COUNT_AT, "matrix count is zero"));
    }
    if header.byte_size % header.matrix_count != 0 {
        return Err(ParseError::malformed(
            start + BYTE_SIZE_AT,
            format!(
                "vertex section of {} bytes does not split into {} records",
                header.byte_size, header.matrix_count
            ),
        ));
    }

    let stride = (header.byte_size / header.matrix_count) as usize;
    match format.expected_stride() {
        Some(expected) if stride != expected => Err(ParseError::malformed(
            start + BYTE_SIZE_AT,
            format!("vertex stride {stride} does not match {expected} for {format} meshes"),
        )),
        None if stride < format.min_stride() => Err(ParseError::malformed(
            start + BYTE_SIZE_AT,
            format!("vertex stride {stride} is too small to hold a record"),
        )),
        _ => Ok(stride),
    }
}

struct VertexData {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
}

fn read_vertices(
    section: &[u8],
    stride: usize,
    format: MeshFormat,
    options: &ParseOptions,
) -> ParseResult<VertexData> {
    let count = section.len() / stride;
    let uv_at = format.uv_offset(stride);
    let mut out = VertexData {
        vertices: Vec::with_capacity(count),
        normals: Vec::with_capacity(count),
        uvs: Vec::with_capacity(count),
    };

    for (i, record) in section.chunks_exact(stride).enumerate() {
        out.vertices.push(read_vec3_at(record, 0)?);

        // Normals are addressed from the section, so in records narrower
        // than 0x12 bytes they run into the next record, or read as zero
        // past the end.
        let normal_at = i * stride + NORMAL_AT;
        out.normals.push(Vec3::new(
            decode_half(section, normal_at),
            decode_half(section, normal_at + 2),
            decode_half(section, normal_at + 4),
        ));

        let u = decode_half(record, uv_at);
        let v = decode_half(record, uv_at + 2);
        out.uvs.push(Vec2::new(u, if options.flip_uv_v { 1.0 - v } else { v }));
    }

    Ok(out)
}

fn read_faces(data: &[u8], start: usize, len: usize) -> ParseResult<Vec<[u16; 3]>> {
    // Bounds of the whole section first, so a truncated file fails here.
    ByteCursor::at(data, start).skip(len)?;

    let mut faces = Vec::with_capacity(len / FACE_STRIDE);
    for rel in (0..len).step_by(FACE_STRIDE) {
        let at = start + rel;
        if rel + FACE_READ_LEN > len {
            return Err(ParseError::OutOfBounds {
                offset: at,
                requested: FACE_READ_LEN,
                available: len - rel,
            });
        }
        faces.push([
            read_u16_at(data, at)?,
            read_u16_at(data, at + FACE_SLOT)?,
            read_u16_at(data, at + 2 * FACE_SLOT)?,
        ]);
    }

    Ok(faces)
}

fn check_face_indices(faces: &[[u16; 3]], vertex_count: usize, start: usize) -> ParseResult<()> {
    for (i, face) in faces.iter().enumerate() {
        if let Some(&bad) = face.iter().find(|&&idx| usize::from(idx) >= vertex_count) {
            return Err(ParseError::malformed(
                start + i * FACE_STRIDE,
                format!("face {i} references vertex {bad} of {vertex_count}"),
            ));
        }
    }
    Ok(())
}

/// Decode the block whose header begins at `start`.
///
/// On success returns the block and the offset just past its face section.
pub(crate) fn decode_block(
    data: &[u8],
    start: usize,
    format: MeshFormat,
    options: &ParseOptions,
) -> Result<(MeshBlock, usize), BlockStop> {
    let header = read_header(data, start).map_err(|e| (ParsePhase::ReadingHeader, e))?;
    let stride =
        vertex_stride(&header, format, start).map_err(|e| (ParsePhase::ReadingHeader, e))?;

    tracing::debug!(
        start = %format_args!("{start:#x}"),
        objects = header.object_count,
        face_groups = header.face_group_count,
        matrices = header.matrix_count,
        byte_size = %format_args!("{:#x}", header.byte_size),
        "Read block header"
    );

    let vertex_start = start + HEADER_LEN;
    let section = ByteCursor::at(data, vertex_start)
        .bytes(header.byte_size as usize)
        .map_err(|e| (ParsePhase::ParsingVertices, e))?;
    let vertex_data = read_vertices(section, stride, format, options)
        .map_err(|e| (ParsePhase::ParsingVertices, e))?;

    let size_at = vertex_start + section.len();
    let face_byte_size = read_u32_at(data, size_at).map_err(|e| (ParsePhase::ParsingFaces, e))?;
    if face_byte_size as usize >= data.len() {
        return Err((
            ParsePhase::ParsingFaces,
            ParseError::malformed(
                size_at,
                format!(
                    "face block size {face_byte_size:#x} exceeds file length {:#x}",
                    data.len()
                ),
            ),
        ));
    }

    let face_start = size_at + 4;
    let faces = read_faces(data, face_start, face_byte_size as usize)
        .map_err(|e| (ParsePhase::ParsingFaces, e))?;
    if options.validate_face_indices {
        check_face_indices(&faces, vertex_data.vertices.len(), face_start)
            .map_err(|e| (ParsePhase::ParsingFaces, e))?;
    }

    let end = face_start + face_byte_size as usize;
    tracing::trace!(
        vertices = vertex_data.vertices.len(),
        faces = faces.len(),
        end = %format_args!("{end:#x}"),
        "Decoded block"
    );

    Ok((
        MeshBlock {
            object_count: header.object_count,
            face_group_count: header.face_group_count,
            matrix_count: header.matrix_count,
            byte_size: header.byte_size,
            vertices: vertex_data.vertices,
            normals: vertex_data.normals,
            uvs: vertex_data.uvs,
            faces,
            face_byte_size,
            name: None,
        },
        end,
    ))
}
