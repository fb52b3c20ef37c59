//! Shared scene types and the `.bmf` binary asset format
//!
//! This crate is shared between:
//! - `bmf-export` (scene conversion pipeline, writes `.bmf`)
//! - renderers that load `.bmf` files
//!
//! # Modules
//!
//! - [`vertex`] - Interleaved vertex record and attribute flags
//! - [`scene`] - Mesh buffers, materials and the persisted scene
//! - [`formats`] - `.bmf` byte layout, reader and writer

mod error;
pub mod formats;
pub mod scene;
pub mod vertex;

pub use error::{FormatError, Result};

pub use vertex::{AttributeFlags, Vertex, vertex_stride};

pub use scene::{Material, MeshBuffer, SceneData, TextureRef, mesh_texture_ids, texture_refs};

pub use formats::{
    BMF_EXT, BmfDocument, BmfReader, BmfWriter, MaterialHeader, MaterialRecord, MeshHeader,
    MeshRecord, PATH_PREFIX, decode_scene, encode_scene, read_scene_file, write_scene,
};
