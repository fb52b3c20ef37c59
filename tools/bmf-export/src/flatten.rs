//! Scene graph flattening
//!
//! Walks the node hierarchy depth-first in pre-order: a node's own meshes,
//! in the order the node lists them, come before any of its children's. The
//! position of each [`RawMeshData`] in the output is the only record of that
//! order, and it becomes the mesh order of the `.bmf` file.

use crate::error::ExportError;
use crate::import::{ImportMesh, ImportNode, ImportScene};

/// Per-mesh attribute arrays extracted from the source scene
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMeshData {
    pub positions: Vec<[f32; 3]>,
    /// Empty when the source mesh has no normals
    pub normals: Vec<[f32; 3]>,
    /// Empty when the source mesh has no tangents
    pub tangents: Vec<[f32; 3]>,
    /// First UV channel, empty when the mesh has none
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub material_index: usize,
}

impl RawMeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Flatten the hierarchy into one [`RawMeshData`] per mesh reference
///
/// A mesh referenced by several nodes appears once per reference.
pub fn flatten_scene(scene: &ImportScene) -> Result<Vec<RawMeshData>, ExportError> {
    let mut out = Vec::new();
    visit(&scene.root, scene, &mut out)?;
    tracing::debug!("Flattened {} mesh instances", out.len());
    Ok(out)
}

fn visit(
    node: &ImportNode,
    scene: &ImportScene,
    out: &mut Vec<RawMeshData>,
) -> Result<(), ExportError> {
    for &mesh_index in &node.mesh_indices {
        let mesh = scene
            .meshes
            .get(mesh_index)
            .ok_or_else(|| ExportError::DanglingMeshReference {
                node: node.name.clone(),
                mesh_index,
                mesh_count: scene.meshes.len(),
            })?;
        out.push(extract_mesh(mesh_index, mesh)?);
    }

    for child in &node.children {
        visit(child, scene, out)?;
    }
    Ok(())
}

/// Copy attribute arrays and flatten faces into a triangle-list index array
pub fn extract_mesh(mesh_index: usize, mesh: &ImportMesh) -> Result<RawMeshData, ExportError> {
    let vertex_count = mesh.positions.len();

    check_length(mesh_index, "normals", mesh.normals.len(), vertex_count)?;
    check_length(mesh_index, "tangents", mesh.tangents.len(), vertex_count)?;

    let uvs = match &mesh.uvs {
        Some(uvs) => {
            check_length(mesh_index, "uvs", uvs.len(), vertex_count)?;
            uvs.clone()
        }
        None => {
            tracing::warn!(
                "Mesh {} has no texture coordinates, UVs default to (0, 0)",
                mesh_index
            );
            Vec::new()
        }
    };

    let mut indices = Vec::with_capacity(mesh.faces.len() * 3);
    for (face_index, face) in mesh.faces.iter().enumerate() {
        if face.0.len() != 3 {
            return Err(ExportError::NonTriangleFace {
                mesh: mesh_index,
                face: face_index,
                count: face.0.len(),
            });
        }
        indices.extend_from_slice(&face.0);
    }

    Ok(RawMeshData {
        positions: mesh.positions.clone(),
        normals: mesh.normals.clone(),
        tangents: mesh.tangents.clone(),
        uvs,
        indices,
        material_index: mesh.material_index,
    })
}

/// An attribute array is either absent (empty) or one entry per vertex
fn check_length(
    mesh: usize,
    attribute: &'static str,
    len: usize,
    vertex_count: usize,
) -> Result<(), ExportError> {
    if len == 0 || len == vertex_count {
        Ok(())
    } else {
        Err(ExportError::AttributeLengthMismatch {
            mesh,
            attribute,
            len,
            vertex_count,
        })
    }
}
