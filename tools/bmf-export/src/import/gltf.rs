//! glTF/GLB scene import
//!
//! Every scene's root nodes become children of one synthetic root. Each
//! (node, primitive) instance becomes its own [`ImportMesh`] with the node's
//! world transform baked into its vertex data, so the flattened output needs
//! no per-mesh transform.

use anyhow::{Context, Result, bail};
use glam::{Mat3, Mat4, Vec3};
use std::path::Path;

use super::{Face, ImportMaterial, ImportMesh, ImportNode, ImportScene};

/// Name given to the synthetic root node
pub const ROOT_NODE_NAME: &str = "root";

/// Import a glTF or GLB file
///
/// Images are not loaded: materials only need their file references, and a
/// missing texture must reach the texture resolver instead of failing here.
pub fn load(input: &Path) -> Result<ImportScene> {
    let gltf::Gltf { document, blob } =
        gltf::Gltf::open(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;
    let buffers = gltf::import_buffers(&document, input.parent(), blob)
        .with_context(|| format!("Failed to load glTF buffers: {:?}", input))?;
    convert_document(&document, &buffers)
}

/// Convert a parsed document into the import model
pub fn convert_document(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<ImportScene> {
    let mut materials: Vec<ImportMaterial> = document.materials().map(convert_material).collect();
    let default_material = materials.len();
    let mut uses_default_material = false;

    let mut meshes = Vec::new();
    let mut root = ImportNode::new(ROOT_NODE_NAME);

    let roots: Vec<gltf::Node> = if document.scenes().next().is_some() {
        document.scenes().flat_map(|scene| scene.nodes()).collect()
    } else {
        // No scenes: every node that is nobody's child is a root
        let child_ids: Vec<usize> = document
            .nodes()
            .flat_map(|n| n.children().map(|c| c.index()))
            .collect();
        document
            .nodes()
            .filter(|n| !child_ids.contains(&n.index()))
            .collect()
    };

    let mut builder = NodeBuilder {
        buffers,
        meshes: &mut meshes,
        default_material,
        uses_default_material: &mut uses_default_material,
    };
    for node in roots {
        let child = builder.convert_node(&node, Mat4::IDENTITY)?;
        root.children.push(child);
    }

    if uses_default_material {
        tracing::debug!("Adding default material for primitives without one");
        materials.push(ImportMaterial::default());
    }

    Ok(ImportScene {
        root,
        meshes,
        materials,
    })
}

struct NodeBuilder<'a> {
    buffers: &'a [gltf::buffer::Data],
    meshes: &'a mut Vec<ImportMesh>,
    default_material: usize,
    uses_default_material: &'a mut bool,
}

impl NodeBuilder<'_> {
    fn convert_node(&mut self, node: &gltf::Node, parent: Mat4) -> Result<ImportNode> {
        let local = Mat4::from_cols_array_2d(&node.transform().matrix());
        let world = parent * local;

        let name = node
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("node_{}", node.index()));
        let mut out = ImportNode::new(name);

        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                let material_index = match primitive.material().index() {
                    Some(index) => index,
                    None => {
                        *self.uses_default_material = true;
                        self.default_material
                    }
                };
                let converted = convert_primitive(&primitive, self.buffers, world, material_index)
                    .with_context(|| {
                        format!(
                            "Mesh {} primitive {} on node {:?}",
                            mesh.index(),
                            primitive.index(),
                            out.name
                        )
                    })?;
                out.mesh_indices.push(self.meshes.len());
                self.meshes.push(converted);
            }
        }

        for child in node.children() {
            let converted = self.convert_node(&child, world)?;
            out.children.push(converted);
        }
        Ok(out)
    }
}

fn convert_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    world: Mat4,
    material_index: usize,
) -> Result<ImportMesh> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        bail!(
            "Primitive mode {:?} is not a triangle list; only triangles are supported",
            primitive.mode()
        );
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .context("No positions in primitive")?
        .map(|p| world.transform_point3(Vec3::from(p)).to_array())
        .collect();

    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|iter| {
            iter.map(|n| (normal_matrix * Vec3::from(n)).normalize_or_zero().to_array())
                .collect()
        })
        .unwrap_or_default();

    // xyz only; the handedness sign in w is not carried
    let tangents: Vec<[f32; 3]> = reader
        .read_tangents()
        .map(|iter| {
            iter.map(|t| {
                world
                    .transform_vector3(Vec3::new(t[0], t[1], t[2]))
                    .normalize_or_zero()
                    .to_array()
            })
            .collect()
        })
        .unwrap_or_default();

    let uvs: Option<Vec<[f32; 2]>> = reader
        .read_tex_coords(0)
        .map(|iter| iter.into_f32().collect());

    let indices: Vec<u32> = match reader.read_indices() {
        Some(iter) => iter.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    Ok(ImportMesh {
        positions,
        normals,
        tangents,
        uvs,
        faces: indices.chunks(3).map(|c| Face(c.to_vec())).collect(),
        material_index,
    })
}

/// Map a metallic-roughness material onto the diffuse/specular model
fn convert_material(material: gltf::Material) -> ImportMaterial {
    let pbr = material.pbr_metallic_roughness();
    let [er, eg, eb] = material.emissive_factor();
    let roughness = pbr.roughness_factor().clamp(0.0, 1.0);

    ImportMaterial {
        diffuse: pbr.base_color_factor(),
        specular: [0.0, 0.0, 0.0, 1.0],
        emissive: [er, eg, eb, 1.0],
        shininess: (1.0 - roughness) * 128.0,
        shininess_strength: 1.0,
        diffuse_texture: pbr
            .base_color_texture()
            .and_then(|info| image_reference(&info.texture())),
        normal_texture: material
            .normal_texture()
            .and_then(|normal| image_reference(&normal.texture())),
    }
}

/// File reference of a texture's image; embedded images have none
fn image_reference(texture: &gltf::Texture) -> Option<String> {
    match texture.source().source() {
        gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => {
            Some(uri.to_string())
        }
        _ => None,
    }
}
