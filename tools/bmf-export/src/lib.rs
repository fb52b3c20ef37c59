//! bmf-export library
//!
//! Converts imported 3D scenes to `.bmf` assets. The pipeline is exposed
//! piece by piece so other tools can drive it with their own importers or
//! texture resolution strategies.

pub mod assemble;
pub mod convert;
mod error;
pub mod flatten;
pub mod formats;
pub mod import;
pub mod manifest;
pub mod material;
pub mod resolve;

pub use error::ExportError;

// Re-export the scene model from bmf-common
pub use bmf_common::{Material, MeshBuffer, SceneData, TextureRef, Vertex};

pub use assemble::{ScalePolicy, assemble_scene};
pub use convert::{ConvertOptions, convert_import_scene, convert_scene, convert_scene_to_memory};
pub use flatten::{RawMeshData, flatten_scene};
pub use formats::write_scene_file;
pub use import::{Face, ImportMaterial, ImportMesh, ImportNode, ImportScene, load_scene};
pub use material::{ResolveOptions, resolve_materials};
pub use resolve::{KeepReference, MissingTexturePolicy, SkipMissing, TextureResolver};

#[cfg(feature = "dialog")]
pub use resolve::FileDialog;
