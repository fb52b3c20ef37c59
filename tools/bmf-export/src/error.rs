//! Precondition violations in the source scene
//!
//! These abort a conversion before any output is written. Import and I/O
//! failures travel as `anyhow::Error` with context instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("mesh {mesh}: face {face} has {count} indices, expected 3 (triangulate the scene first)")]
    NonTriangleFace {
        mesh: usize,
        face: usize,
        count: usize,
    },

    #[error("node '{node}' references mesh {mesh_index}, but the scene has {mesh_count} meshes")]
    DanglingMeshReference {
        node: String,
        mesh_index: usize,
        mesh_count: usize,
    },

    #[error("mesh {mesh}: {attribute} has {len} entries for {vertex_count} vertices")]
    AttributeLengthMismatch {
        mesh: usize,
        attribute: &'static str,
        len: usize,
        vertex_count: usize,
    },

    #[error("mesh {mesh} uses material {material_index}, but the scene has {material_count} materials")]
    DanglingMaterialReference {
        mesh: usize,
        material_index: usize,
        material_count: usize,
    },
}
