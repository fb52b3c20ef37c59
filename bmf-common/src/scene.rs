//! Renderer-ready scene types
//!
//! [`SceneData`] is the unit persisted to a `.bmf` file: an ordered list of
//! [`MeshBuffer`]s, the resolved [`Material`]s and a scene-level origin and
//! transform. The texture-id lists are derived from the materials on demand,
//! so a scene holds nothing the file cannot store.
//!
//! Array position is identity throughout: a mesh's `material_index` is a
//! position in `materials`, and the order of `meshes` is the depth-first
//! pre-order in which the exporter visited the source hierarchy. Nothing in
//! the file records that order separately.

use glam::{Mat4, Vec3};

use crate::vertex::Vertex;

/// Resolved shading parameters for one source material
///
/// Colors are RGBA with alpha fixed at 1.0, since the file stores RGB only.
/// Specular has already been scaled by the source's shininess strength. A map
/// path is only kept when it is non-empty, so `has_*_map()` and the presence
/// of the path always agree.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    diffuse: [f32; 4],
    specular: [f32; 4],
    emissive: [f32; 4],
    shininess: f32,
    diffuse_map: Option<String>,
    normal_map: Option<String>,
}

impl Material {
    pub fn new(
        diffuse: [f32; 4],
        specular: [f32; 4],
        emissive: [f32; 4],
        shininess: f32,
        diffuse_map: Option<String>,
        normal_map: Option<String>,
    ) -> Self {
        Self {
            diffuse: opaque(diffuse),
            specular: opaque(specular),
            emissive: opaque(emissive),
            shininess,
            diffuse_map: diffuse_map.filter(|p| !p.is_empty()),
            normal_map: normal_map.filter(|p| !p.is_empty()),
        }
    }

    pub fn diffuse(&self) -> [f32; 4] {
        self.diffuse
    }

    pub fn specular(&self) -> [f32; 4] {
        self.specular
    }

    pub fn emissive(&self) -> [f32; 4] {
        self.emissive
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    pub fn diffuse_map(&self) -> Option<&str> {
        self.diffuse_map.as_deref()
    }

    pub fn normal_map(&self) -> Option<&str> {
        self.normal_map.as_deref()
    }

    pub fn has_diffuse_map(&self) -> bool {
        self.diffuse_map.is_some()
    }

    pub fn has_normal_map(&self) -> bool {
        self.normal_map.is_some()
    }
}

fn opaque([r, g, b, _]: [f32; 4]) -> [f32; 4] {
    [r, g, b, 1.0]
}

/// Flattened, draw-ready mesh
///
/// Owns its vertices and a triangle-list index buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBuffer {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    pub material_index: usize,
    pub transform: Mat4,
}

impl MeshBuffer {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, material_index: usize) -> Self {
        Self {
            vertices,
            indices,
            material_index,
            transform: Mat4::IDENTITY,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn indices_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// First index value that does not address a vertex, if any
    pub fn first_invalid_index(&self) -> Option<u32> {
        let vertex_count = self.vertices.len();
        self.indices
            .iter()
            .copied()
            .find(|&i| i as usize >= vertex_count)
    }

    /// Check index bounds and the material reference; `mesh` labels errors
    pub fn validate(&self, mesh: usize, material_count: usize) -> crate::Result<()> {
        if let Some(index) = self.first_invalid_index() {
            return Err(crate::FormatError::IndexOutOfRange {
                mesh,
                index,
                vertex_count: self.vertex_count(),
            });
        }
        if self.material_index >= material_count {
            return Err(crate::FormatError::MaterialOutOfRange {
                mesh,
                material_index: self.material_index as u64,
                material_count,
            });
        }
        Ok(())
    }
}

/// Entry of the scene's texture-id list: a material position and its diffuse map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRef {
    pub material_index: usize,
    pub path: Option<String>,
}

/// Builds the texture-id list, one entry per material in material order
pub fn texture_refs(materials: &[Material]) -> Vec<TextureRef> {
    materials
        .iter()
        .enumerate()
        .map(|(material_index, material)| TextureRef {
            material_index,
            path: material.diffuse_map().map(str::to_owned),
        })
        .collect()
}

/// Texture ids for a mesh using `material_index`
pub fn mesh_texture_ids(materials: &[Material], material_index: usize) -> Vec<usize> {
    match materials.get(material_index) {
        Some(material) if material.has_diffuse_map() => vec![material_index],
        _ => Vec::new(),
    }
}

/// The unit persisted to a `.bmf` file
#[derive(Debug, Clone, PartialEq)]
pub struct SceneData {
    pub meshes: Vec<MeshBuffer>,
    pub materials: Vec<Material>,
    pub position: Vec3,
    pub transform: Mat4,
}

impl Default for SceneData {
    fn default() -> Self {
        Self {
            meshes: Vec::new(),
            materials: Vec::new(),
            position: Vec3::ZERO,
            transform: Mat4::IDENTITY,
        }
    }
}

impl SceneData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total vertex count across all meshes
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(MeshBuffer::vertex_count).sum()
    }

    /// Total triangle count across all meshes
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshBuffer::triangle_count).sum()
    }

    /// The texture-id list, one entry per material
    pub fn texture_ids(&self) -> Vec<TextureRef> {
        texture_refs(&self.materials)
    }

    /// Positions in [`Self::texture_ids`] used by `mesh`
    pub fn mesh_texture_ids(&self, mesh: &MeshBuffer) -> Vec<usize> {
        mesh_texture_ids(&self.materials, mesh.material_index)
    }

    /// Diffuse map of the material used by `mesh`, if any
    pub fn diffuse_texture(&self, mesh: &MeshBuffer) -> Option<&str> {
        self.materials
            .get(mesh.material_index)
            .and_then(Material::diffuse_map)
    }

    /// Check index bounds and material references of every mesh
    pub fn validate(&self) -> crate::Result<()> {
        self.meshes
            .iter()
            .enumerate()
            .try_for_each(|(mesh_idx, mesh)| mesh.validate(mesh_idx, self.materials.len()))
    }
}
