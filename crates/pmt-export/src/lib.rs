//! PMT Export Pipeline
//!
//! Feeds decoded assets into a scene builder:
//! - [`SceneBuilder`]: the contract a host scene graph implements
//! - JSON (scene document with meshes, armatures and keyframes)
//! - OBJ (Wavefront geometry, meshes only)

pub mod json;
pub mod obj;
pub mod scene;

pub use json::{JsonError, JsonExportOptions, JsonSceneBuilder};
pub use obj::{ObjError, ObjWriter};
pub use scene::{
    armature_from_skeleton, import_animation, import_mesh, import_skeleton, mesh_objects,
    Armature, ArmatureBone, IkLink, Keyframe, MeshObject, SceneBuilder,
};
