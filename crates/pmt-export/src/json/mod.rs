//! JSON scene document export
//!
//! Collects meshes, armatures and keyframe tracks into a single document
//! that other tools can load without knowing the binary formats.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde_json::json;
use thiserror::Error;

use crate::scene::{Armature, Keyframe, MeshObject, SceneBuilder};

/// JSON export errors
#[derive(Error, Debug)]
pub enum JsonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export failed: {0}")]
    ExportFailed(String),
}

pub type JsonResult<T> = Result<T, JsonError>;

impl From<JsonError> for pmt_core::Error {
    fn from(e: JsonError) -> Self {
        match e {
            JsonError::Io(io) => pmt_core::Error::Io(io),
            other => pmt_core::Error::export_failed(other.to_string()),
        }
    }
}

/// JSON export options
#[derive(Debug, Clone)]
pub struct JsonExportOptions {
    /// Use pretty-print formatting
    pub pretty: bool,

    /// Include metadata (source name, counts, frame range)
    pub include_metadata: bool,
}

impl Default for JsonExportOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            include_metadata: true,
        }
    }
}

/// Scene builder that accumulates a JSON document
#[derive(Debug, Default)]
pub struct JsonSceneBuilder {
    options: JsonExportOptions,
    source: Option<String>,
    meshes: Vec<MeshObject>,
    armatures: Vec<Armature>,
    animation: BTreeMap<String, Vec<Keyframe>>,
    frame_range: Option<(usize, usize)>,
}

impl JsonSceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: JsonExportOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Record the name of the file the scene came from
    pub fn source(mut self, name: impl Into<String>) -> Self {
        self.source = Some(name.into());
        self
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Build the document
    pub fn to_value(&self) -> serde_json::Value {
        let scene = json!({
            "meshes": self.meshes,
            "armatures": self.armatures,
            "animation": self.animation,
        });

        if !self.options.include_metadata {
            return scene;
        }

        json!({
            "metadata": {
                "source": self.source,
                "generator": concat!("pmt-export ", env!("CARGO_PKG_VERSION")),
                "mesh_count": self.meshes.len(),
                "vertex_count": self.meshes.iter().map(|m| m.vertices.len()).sum::<usize>(),
                "armature_count": self.armatures.len(),
                "animated_objects": self.animation.len(),
                "frame_range": self.frame_range,
            },
            "scene": scene,
        })
    }

    /// Write the document to `output_path`
    pub fn write(&self, output_path: impl AsRef<Path>) -> JsonResult<()> {
        let file = File::create(output_path)?;
        let writer = BufWriter::new(file);
        let value = self.to_value();

        if self.options.pretty {
            serde_json::to_writer_pretty(writer, &value)?;
        } else {
            serde_json::to_writer(writer, &value)?;
        }

        Ok(())
    }
}

impl SceneBuilder for JsonSceneBuilder {
    type Error = JsonError;

    fn add_mesh(&mut self, mesh: MeshObject) -> JsonResult<()> {
        self.meshes.push(mesh);
        Ok(())
    }

    fn add_armature(&mut self, armature: Armature) -> JsonResult<()> {
        self.armatures.push(armature);
        Ok(())
    }

    fn insert_keyframes(&mut self, target: &str, keys: &[Keyframe]) -> JsonResult<()> {
        self.animation
            .entry(target.to_string())
            .or_default()
            .extend_from_slice(keys);
        Ok(())
    }

    fn set_frame_range(&mut self, start: usize, end: usize) -> JsonResult<()> {
        if end < start {
            return Err(JsonError::ExportFailed(format!(
                "frame range {start}..{end} is empty"
            )));
        }
        self.frame_range = Some((start, end));
        Ok(())
    }
}
