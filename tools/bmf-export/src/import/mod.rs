//! Source scene model and importers
//!
//! Importers turn a file on disk into an [`ImportScene`]: a node hierarchy
//! whose nodes reference meshes by position, a mesh list with per-vertex
//! attribute arrays and faces, and a material list. Everything after this
//! point (flattening, material resolution, assembly) works on this model
//! only, so tests can build scenes by hand.

pub mod gltf;

#[cfg(feature = "assimp")]
pub mod assimp;

use anyhow::Result;
use std::path::Path;

/// Hierarchical scene as produced by an importer
#[derive(Debug, Clone, Default)]
pub struct ImportScene {
    pub root: ImportNode,
    pub meshes: Vec<ImportMesh>,
    pub materials: Vec<ImportMaterial>,
}

/// Hierarchy element owning zero or more meshes and child nodes
#[derive(Debug, Clone, Default)]
pub struct ImportNode {
    pub name: String,
    /// Positions in [`ImportScene::meshes`]
    pub mesh_indices: Vec<usize>,
    pub children: Vec<ImportNode>,
}

impl ImportNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_meshes(mut self, mesh_indices: impl IntoIterator<Item = usize>) -> Self {
        self.mesh_indices.extend(mesh_indices);
        self
    }

    pub fn with_child(mut self, child: ImportNode) -> Self {
        self.children.push(child);
        self
    }
}

/// One polygon of a mesh, as indices into the mesh's vertex arrays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face(pub Vec<u32>);

/// One drawable surface of the source scene
///
/// `normals` and `tangents` are empty when the source has none. `uvs` is the
/// first texture-coordinate channel, `None` when the mesh has no channel 0.
#[derive(Debug, Clone, Default)]
pub struct ImportMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tangents: Vec<[f32; 3]>,
    pub uvs: Option<Vec<[f32; 2]>>,
    pub faces: Vec<Face>,
    pub material_index: usize,
}

impl ImportMesh {
    /// Mesh with positions and triangle faces only
    pub fn triangles(positions: Vec<[f32; 3]>, indices: &[u32], material_index: usize) -> Self {
        Self {
            positions,
            faces: indices.chunks(3).map(|c| Face(c.to_vec())).collect(),
            material_index,
            ..Default::default()
        }
    }

    pub fn with_uvs(mut self, uvs: Vec<[f32; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }
}

/// Source material properties before texture resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ImportMaterial {
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub emissive: [f32; 4],
    pub shininess: f32,
    pub shininess_strength: f32,
    /// Diffuse texture reference as written in the source file
    pub diffuse_texture: Option<String>,
    /// Normal map reference as written in the source file
    pub normal_texture: Option<String>,
}

impl Default for ImportMaterial {
    fn default() -> Self {
        Self {
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            emissive: [0.0, 0.0, 0.0, 1.0],
            shininess: 0.0,
            shininess_strength: 1.0,
            diffuse_texture: None,
            normal_texture: None,
        }
    }
}

/// Import a scene file, picking the importer by extension
pub fn load_scene(path: &Path) -> Result<ImportScene> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "gltf" | "glb" => gltf::load(path),
        #[cfg(feature = "assimp")]
        _ => assimp::load(path),
        #[cfg(not(feature = "assimp"))]
        _ => anyhow::bail!(
            "Unsupported scene format: {:?} (use .gltf or .glb, or build with the `assimp` feature)",
            path
        ),
    }
}

/// Whether [`load_scene`] can handle files with this extension
pub fn is_supported(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("gltf" | "glb") => true,
        Some(_) => cfg!(feature = "assimp"),
        None => false,
    }
}
