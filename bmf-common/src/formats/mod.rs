//! `.bmf` binary scene format
//!
//! [`bmf`] defines the byte layout and the record types, [`BmfWriter`] and
//! [`BmfReader`] move them to and from a stream. The functions below map
//! between the stored records and the renderer-facing [`SceneData`].
//!
//! Every [`MeshBuffer`] is stored with the UV attribute (a [`Vertex`] always
//! carries one). Records carrying normals or tangents can be read, but the
//! projection into `MeshBuffer` drops them: the renderer model has no place
//! for them.

pub mod bmf;
mod reader;
mod serialization;
mod writer;

pub use bmf::*;
pub use reader::{BmfReader, MIN_STREAM_SIZE};
pub use serialization::BinarySerializable;
pub use writer::BmfWriter;

use glam::{Mat4, Vec3};
use std::io::Write;
use std::path::Path;

use crate::scene::{Material, MeshBuffer, SceneData};
use crate::vertex::Vertex;
use crate::{FormatError, Result};

/// Convert a scene to the records stored on disk
pub fn scene_to_document(scene: &SceneData) -> Result<BmfDocument> {
    scene.validate()?;

    let materials = scene
        .materials
        .iter()
        .map(|m| MaterialRecord {
            header: MaterialHeader {
                diffuse: rgb(m.diffuse()),
                specular: rgb(m.specular()),
                emissive: rgb(m.emissive()),
                shininess: m.shininess(),
            },
            diffuse_path: m.diffuse_map().map(str::to_owned),
            normal_path: m.normal_map().map(str::to_owned),
        })
        .collect();

    let meshes = scene
        .meshes
        .iter()
        .map(|mesh| MeshRecord {
            material_index: mesh.material_index as u64,
            transform: mesh.transform.to_cols_array(),
            positions: mesh.vertices().iter().map(|v| v.position).collect(),
            normals: Vec::new(),
            tangents: Vec::new(),
            uvs: mesh.vertices().iter().map(|v| v.uv).collect(),
            indices: mesh.indices().to_vec(),
        })
        .collect();

    Ok(BmfDocument {
        materials,
        meshes,
        position: scene.position.to_array(),
        transform: scene.transform.to_cols_array(),
    })
}

/// Project stored records back into a scene
pub fn document_to_scene(doc: BmfDocument) -> Result<SceneData> {
    doc.validate()?;

    let materials: Vec<Material> = doc
        .materials
        .into_iter()
        .map(|m| {
            Material::new(
                rgba(m.header.diffuse),
                rgba(m.header.specular),
                rgba(m.header.emissive),
                m.header.shininess,
                m.diffuse_path,
                m.normal_path,
            )
        })
        .collect();

    let meshes = doc
        .meshes
        .into_iter()
        .enumerate()
        .map(|(mesh_idx, record)| -> Result<MeshBuffer> {
            if !record.normals.is_empty() || !record.tangents.is_empty() {
                tracing::debug!("Mesh {}: dropping stored normals/tangents", mesh_idx);
            }
            let vertices = record
                .positions
                .iter()
                .enumerate()
                .map(|(i, &position)| Vertex {
                    position,
                    uv: record.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                })
                .collect();
            let material_index = usize::try_from(record.material_index)
                .map_err(|_| FormatError::CountTooLarge(record.material_index))?;
            let mut mesh = MeshBuffer::new(vertices, record.indices, material_index);
            mesh.transform = Mat4::from_cols_array(&record.transform);
            Ok(mesh)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SceneData {
        meshes,
        materials,
        position: Vec3::from_array(doc.position),
        transform: Mat4::from_cols_array(&doc.transform),
    })
}

/// Encode a scene to `w`
pub fn write_scene<W: Write>(w: W, scene: &SceneData) -> Result<()> {
    let doc = scene_to_document(scene)?;
    BmfWriter::new(w).write_document(&doc)
}

/// Encode a scene to a new byte vector
pub fn encode_scene(scene: &SceneData) -> Result<Vec<u8>> {
    let doc = scene_to_document(scene)?;
    let mut writer = BmfWriter::new(Vec::with_capacity(doc.encoded_len()));
    writer.write_document(&doc)?;
    Ok(writer.into_inner())
}

/// Decode a complete `.bmf` stream
pub fn decode_scene(bytes: &[u8]) -> Result<SceneData> {
    let doc = BmfReader::new(bytes).read_document()?;
    document_to_scene(doc)
}

/// Read and decode a `.bmf` file
pub fn read_scene_file(path: &Path) -> Result<SceneData> {
    let bytes = std::fs::read(path)?;
    decode_scene(&bytes)
}

fn rgb(c: [f32; 4]) -> [f32; 3] {
    [c[0], c[1], c[2]]
}

fn rgba(c: [f32; 3]) -> [f32; 4] {
    [c[0], c[1], c[2], 1.0]
}
