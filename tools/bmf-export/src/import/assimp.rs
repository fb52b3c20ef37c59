//! Assimp-based scene import (FBX, OBJ, DAE, ...)
//!
//! Loading runs the pre-transform-vertices step, so every mesh arrives in
//! scene space and node transforms can be ignored.

use anyhow::{Result, anyhow};
use russimp::material::{Material as RMaterial, PropertyTypeInfo, TextureType};
use russimp::mesh::Mesh as RMesh;
use russimp::node::Node as RNode;
use russimp::scene::{PostProcess, Scene as RScene};
use std::path::Path;

use super::{Face, ImportMaterial, ImportMesh, ImportNode, ImportScene};

fn post_process() -> Vec<PostProcess> {
    vec![
        PostProcess::PreTransformVertices,
        PostProcess::Triangulate,
        PostProcess::GenerateNormals,
        PostProcess::JoinIdenticalVertices,
        PostProcess::CalculateTangentSpace,
    ]
}

/// Import any format Assimp understands
pub fn load(path: &Path) -> Result<ImportScene> {
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow!("Path contains non-UTF8 characters: {:?}", path))?;

    let scene = RScene::from_file(path_str, post_process())
        .map_err(|e| anyhow!("Assimp import failed for {:?}: {:?}", path, e))?;

    let root = scene
        .root
        .as_ref()
        .map(|node| convert_node(node))
        .unwrap_or_default();

    Ok(ImportScene {
        root,
        meshes: scene.meshes.iter().map(convert_mesh).collect(),
        materials: scene.materials.iter().map(convert_material).collect(),
    })
}

fn convert_node(node: &RNode) -> ImportNode {
    ImportNode {
        name: node.name.clone(),
        mesh_indices: node.meshes.iter().map(|&m| m as usize).collect(),
        children: node
            .children
            .borrow()
            .iter()
            .map(|child| convert_node(child))
            .collect(),
    }
}

fn convert_mesh(mesh: &RMesh) -> ImportMesh {
    let uvs = mesh
        .texture_coords
        .first()
        .and_then(|channel| channel.as_ref())
        .map(|coords| coords.iter().map(|tc| [tc.x, tc.y]).collect());

    ImportMesh {
        positions: mesh.vertices.iter().map(|v| [v.x, v.y, v.z]).collect(),
        normals: mesh.normals.iter().map(|n| [n.x, n.y, n.z]).collect(),
        tangents: mesh.tangents.iter().map(|t| [t.x, t.y, t.z]).collect(),
        uvs,
        faces: mesh.faces.iter().map(|face| Face(face.0.clone())).collect(),
        material_index: mesh.material_index as usize,
    }
}

fn convert_material(mat: &RMaterial) -> ImportMaterial {
    let defaults = ImportMaterial::default();
    ImportMaterial {
        diffuse: color_property(mat, "$clr.diffuse").unwrap_or(defaults.diffuse),
        specular: color_property(mat, "$clr.specular").unwrap_or(defaults.specular),
        emissive: color_property(mat, "$clr.emissive").unwrap_or(defaults.emissive),
        shininess: float_property(mat, "$mat.shininess").unwrap_or(defaults.shininess),
        shininess_strength: float_property(mat, "$mat.shinpercent")
            .unwrap_or(defaults.shininess_strength),
        diffuse_texture: texture_file(mat, TextureType::Diffuse),
        normal_texture: texture_file(mat, TextureType::Normals),
    }
}

fn color_property(mat: &RMaterial, key: &str) -> Option<[f32; 4]> {
    mat.properties
        .iter()
        .filter(|prop| prop.key == key)
        .find_map(|prop| match &prop.data {
            PropertyTypeInfo::FloatArray(f) if f.len() >= 3 => {
                Some([f[0], f[1], f[2], f.get(3).copied().unwrap_or(1.0)])
            }
            _ => None,
        })
}

fn float_property(mat: &RMaterial, key: &str) -> Option<f32> {
    mat.properties
        .iter()
        .filter(|prop| prop.key == key)
        .find_map(|prop| match &prop.data {
            PropertyTypeInfo::FloatArray(f) => f.first().copied(),
            _ => None,
        })
}

fn texture_file(mat: &RMaterial, kind: TextureType) -> Option<String> {
    let texture = mat.textures.get(&kind)?;
    let filename = texture.borrow().filename.clone();
    (!filename.is_empty()).then_some(filename)
}
