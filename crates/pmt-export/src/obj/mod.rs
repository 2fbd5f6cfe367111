//! Wavefront OBJ export
//!
//! Geometry only. Every mesh object becomes an `o` group; UVs and normals are
//! written per loop so the `f` records index them by corner.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::scene::{Armature, Keyframe, MeshObject, SceneBuilder};

#[derive(Error, Debug)]
pub enum ObjError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ cannot hold {0}")]
    Unsupported(&'static str),
}

impl From<ObjError> for pmt_core::Error {
    fn from(e: ObjError) -> Self {
        match e {
            ObjError::Io(io) => pmt_core::Error::Io(io),
            other => pmt_core::Error::UnsupportedFormat {
                format: other.to_string(),
            },
        }
    }
}

/// Streams mesh objects into an OBJ file
pub struct ObjWriter<W: Write> {
    writer: W,
    /// 1-based index of the next `v` record
    next_vertex: usize,
    /// 1-based index of the next `vt`/`vn` record
    next_loop: usize,
    objects: usize,
}

impl ObjWriter<BufWriter<File>> {
    /// Create `path` and write the file header
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ObjError> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> ObjWriter<W> {
    pub fn new(mut writer: W) -> Result<Self, ObjError> {
        writeln!(writer, "# pmt-export {}", env!("CARGO_PKG_VERSION"))?;
        Ok(Self {
            writer,
            next_vertex: 1,
            next_loop: 1,
            objects: 0,
        })
    }

    pub fn object_count(&self) -> usize {
        self.objects
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W, ObjError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> SceneBuilder for ObjWriter<W> {
    type Error = ObjError;

    fn add_mesh(&mut self, mesh: MeshObject) -> Result<(), ObjError> {
        let w = &mut self.writer;
        writeln!(w, "o {}", mesh.name)?;

        for v in &mesh.vertices {
            writeln!(w, "v {} {} {}", v.x, v.y, v.z)?;
        }
        for uv in &mesh.loop_uvs {
            writeln!(w, "vt {} {}", uv.x, uv.y)?;
        }
        for n in &mesh.loop_normals {
            writeln!(w, "vn {} {} {}", n.x, n.y, n.z)?;
        }

        for (i, face) in mesh.faces.iter().enumerate() {
            let corner = |k: usize| {
                let v = self.next_vertex + face[k] as usize;
                let l = self.next_loop + i * 3 + k;
                format!("{v}/{l}/{l}")
            };
            writeln!(w, "f {} {} {}", corner(0), corner(1), corner(2))?;
        }

        self.next_vertex += mesh.vertices.len();
        self.next_loop += mesh.faces.len() * 3;
        self.objects += 1;
        Ok(())
    }

    fn add_armature(&mut self, _armature: Armature) -> Result<(), ObjError> {
        Err(ObjError::Unsupported("armatures"))
    }

    fn insert_keyframes(&mut self, _target: &str, _keys: &[Keyframe]) -> Result<(), ObjError> {
        Err(ObjError::Unsupported("keyframes"))
    }
}
