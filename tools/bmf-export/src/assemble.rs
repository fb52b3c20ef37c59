//! Scene assembly
//!
//! Merges flattened meshes and resolved materials into a [`SceneData`].
//! This is where the attribute set narrows: a [`Vertex`] carries a position
//! and a UV only, so normals and tangents extracted from the source stop
//! here.

use bmf_common::{Material, MeshBuffer, SceneData, Vertex};
use glam::{Mat4, Vec3};
use std::collections::HashMap;
use std::path::Path;

use crate::error::ExportError;
use crate::flatten::RawMeshData;

/// Corrective scale keyed by lower-case source file extension
#[derive(Debug, Clone)]
pub struct ScalePolicy {
    factors: HashMap<String, f32>,
}

impl Default for ScalePolicy {
    /// FBX files are authored in centimetres
    fn default() -> Self {
        Self::empty().with_factor("fbx", 0.1)
    }
}

impl ScalePolicy {
    /// Policy that never corrects
    pub fn empty() -> Self {
        Self {
            factors: HashMap::new(),
        }
    }

    pub fn with_factor(mut self, extension: &str, factor: f32) -> Self {
        self.factors.insert(extension.to_lowercase(), factor);
        self
    }

    /// Scale factor for a source file, if its format needs one
    pub fn factor_for(&self, source: &Path) -> Option<f32> {
        let ext = source.extension()?.to_str()?.to_lowercase();
        self.factors.get(&ext).copied()
    }

    /// Scene transform for a source file; `scale_override` wins over the table
    pub fn scene_transform(&self, source: &Path, scale_override: Option<f32>) -> Mat4 {
        match scale_override.or_else(|| self.factor_for(source)) {
            Some(factor) => {
                tracing::info!("Applying scale {} to {:?}", factor, source);
                Mat4::IDENTITY * Mat4::from_scale(Vec3::splat(factor))
            }
            None => Mat4::IDENTITY,
        }
    }
}

/// Build the persisted scene from flattened meshes and resolved materials
///
/// Mesh order is kept as given. Each vertex pairs a position with the UV at
/// the same index, or (0, 0) past the end of the UV array.
pub fn assemble_scene(
    raw_meshes: Vec<RawMeshData>,
    materials: Vec<Material>,
    transform: Mat4,
) -> Result<SceneData, ExportError> {
    let mut meshes = Vec::with_capacity(raw_meshes.len());

    for (mesh_index, raw) in raw_meshes.into_iter().enumerate() {
        if raw.material_index >= materials.len() {
            return Err(ExportError::DanglingMaterialReference {
                mesh: mesh_index,
                material_index: raw.material_index,
                material_count: materials.len(),
            });
        }

        let vertices: Vec<Vertex> = raw
            .positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex {
                position,
                uv: raw.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect();

        meshes.push(MeshBuffer::new(vertices, raw.indices, raw.material_index));
    }

    Ok(SceneData {
        meshes,
        materials,
        position: Vec3::ZERO,
        transform,
    })
}
