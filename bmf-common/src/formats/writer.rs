//! `.bmf` stream writer

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

use super::BinarySerializable;
use super::bmf::{BmfDocument, MaterialRecord, MeshRecord, PATH_PREFIX};
use crate::Result;

/// Writer for the `.bmf` format
pub struct BmfWriter<W: Write> {
    writer: W,
}

impl<W: Write> BmfWriter<W> {
    /// Create a new writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Validate and write a complete document
    ///
    /// Validation runs before the first byte is written, so an invalid
    /// document never produces partial output.
    pub fn write_document(&mut self, doc: &BmfDocument) -> Result<()> {
        doc.validate()?;

        self.writer.write_u64::<LittleEndian>(doc.materials.len() as u64)?;
        for material in &doc.materials {
            self.write_material(material)?;
        }

        self.writer.write_u64::<LittleEndian>(doc.meshes.len() as u64)?;
        for mesh in &doc.meshes {
            self.write_mesh(mesh)?;
        }

        self.write_f32s(&doc.position)?;
        self.write_f32s(&doc.transform)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Consume the writer, returning the underlying sink
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_material(&mut self, material: &MaterialRecord) -> Result<()> {
        self.write_header(&material.header)?;
        self.write_path(material.diffuse_path.as_deref())?;
        self.write_path(material.normal_path.as_deref())?;
        Ok(())
    }

    /// Length-prefixed path with the models/ prefix; absent paths are zero-length
    fn write_path(&mut self, path: Option<&str>) -> Result<()> {
        match path.filter(|p| !p.is_empty()) {
            Some(path) => {
                let len = PATH_PREFIX.len() + path.len();
                self.writer.write_u64::<LittleEndian>(len as u64)?;
                self.writer.write_all(PATH_PREFIX.as_bytes())?;
                self.writer.write_all(path.as_bytes())?;
            }
            None => self.writer.write_u64::<LittleEndian>(0)?,
        }
        Ok(())
    }

    fn write_mesh(&mut self, mesh: &MeshRecord) -> Result<()> {
        self.write_header(&mesh.header())?;

        for (i, position) in mesh.positions.iter().enumerate() {
            self.write_f32s(position)?;
            if let Some(normal) = mesh.normals.get(i) {
                self.write_f32s(normal)?;
            }
            if let Some(tangent) = mesh.tangents.get(i) {
                self.write_f32s(tangent)?;
            }
            if let Some(uv) = mesh.uvs.get(i) {
                self.write_f32s(uv)?;
            }
        }

        for &index in &mesh.indices {
            self.writer.write_u32::<LittleEndian>(index)?;
        }
        Ok(())
    }

    fn write_header<H: BinarySerializable>(&mut self, header: &H) -> Result<()> {
        self.writer.write_all(&header.serialize())?;
        Ok(())
    }

    fn write_f32s(&mut self, values: &[f32]) -> Result<()> {
        for &v in values {
            self.writer.write_f32::<LittleEndian>(v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{MaterialHeader, MeshHeader};

    fn material(diffuse_path: Option<&str>) -> MaterialRecord {
        MaterialRecord {
            header: MaterialHeader {
                diffuse: [1.0; 3],
                specular: [0.5; 3],
                emissive: [0.0; 3],
                shininess: 8.0,
            },
            diffuse_path: diffuse_path.map(str::to_owned),
            normal_path: None,
        }
    }

    fn document(meshes: Vec<MeshRecord>) -> BmfDocument {
        BmfDocument {
            materials: vec![material(Some("wood.png"))],
            meshes,
            position: [0.0; 3],
            transform: glam::Mat4::IDENTITY.to_cols_array(),
        }
    }

    fn triangle() -> MeshRecord {
        MeshRecord {
            material_index: 0,
            transform: glam::Mat4::IDENTITY.to_cols_array(),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![],
            tangents: vec![],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_written_length_matches_encoded_len() {
        let doc = document(vec![triangle()]);
        let mut buffer = Vec::new();
        BmfWriter::new(&mut buffer).write_document(&doc).unwrap();
        assert_eq!(buffer.len(), doc.encoded_len());
    }

    #[test]
    fn test_path_is_prefixed() {
        let doc = document(vec![]);
        let mut buffer = Vec::new();
        BmfWriter::new(&mut buffer).write_document(&doc).unwrap();

        // material_count, then the 40-byte fixed block, then the diffuse path
        let len_at = 8 + MaterialHeader::SIZE;
        let len = u64::from_le_bytes(buffer[len_at..len_at + 8].try_into().unwrap()) as usize;
        let path = &buffer[len_at + 8..len_at + 8 + len];
        assert_eq!(path, b"models/wood.png");

        // normal path is absent => zero length
        let normal_len_at = len_at + 8 + len;
        assert_eq!(&buffer[normal_len_at..normal_len_at + 8], &[0u8; 8]);
    }

    #[test]
    fn test_vertex_stride_follows_flags() {
        let mut mesh = triangle();
        mesh.normals = vec![[0.0, 0.0, 1.0]; 3];
        let doc = document(vec![mesh]);
        let mut buffer = Vec::new();
        BmfWriter::new(&mut buffer).write_document(&doc).unwrap();

        let mesh_start = doc.encoded_len()
            - crate::formats::TRAILER_SIZE
            - (MeshHeader::SIZE + 3 * 32 + 3 * 4);
        let header = MeshHeader::from_bytes(&buffer[mesh_start..]).unwrap();
        assert_eq!(header.vertex_count, 3);
        assert_eq!(header.flags, 0b101);

        // first vertex: position, normal, uv
        let v0 = &buffer[mesh_start + MeshHeader::SIZE..];
        assert_eq!(&v0[20..24], &1.0f32.to_le_bytes()); // normal.z
    }

    #[test]
    fn test_invalid_document_writes_nothing() {
        let mut mesh = triangle();
        mesh.indices = vec![0, 1, 5];
        let doc = document(vec![mesh]);
        let mut buffer = Vec::new();
        let err = BmfWriter::new(&mut buffer).write_document(&doc).unwrap_err();
        assert!(matches!(
            err,
            crate::FormatError::IndexOutOfRange { index: 5, .. }
        ));
        assert!(buffer.is_empty());
    }
}
