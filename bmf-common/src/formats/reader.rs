//! `.bmf` stream reader
//!
//! Reads from an in-memory byte slice so every count can be checked against
//! the bytes that actually remain before anything is allocated. A stream
//! whose length differs from what its counts imply is rejected.

use byteorder::{ByteOrder, LittleEndian};

use super::BinarySerializable;
use super::bmf::{
    BmfDocument, MIN_MATERIAL_SIZE, MaterialHeader, MaterialRecord, MeshHeader, MeshRecord,
    PATH_PREFIX, TRAILER_SIZE,
};
use crate::vertex::{AttributeFlags, vertex_stride};
use crate::{FormatError, Result};

/// Reader for the `.bmf` format
pub struct BmfReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> BmfReader<'a> {
    /// Create a new reader over a complete `.bmf` stream
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Read and validate a complete document
    pub fn read_document(&mut self) -> Result<BmfDocument> {
        let material_count = self.read_count("material count", MIN_MATERIAL_SIZE)?;
        let mut materials = Vec::with_capacity(material_count);
        for _ in 0..material_count {
            materials.push(self.read_material()?);
        }

        let mesh_count = self.read_count("mesh count", MeshHeader::SIZE)?;
        let mut meshes = Vec::with_capacity(mesh_count);
        for mesh_idx in 0..mesh_count {
            let mesh = self.read_mesh()?;
            mesh.validate(mesh_idx, material_count)?;
            meshes.push(mesh);
        }

        let position = self.read_f32_array::<3>("scene position")?;
        let transform = self.read_f32_array::<16>("scene transform")?;

        let trailing = self.remaining();
        if trailing != 0 {
            return Err(FormatError::TrailingBytes(trailing));
        }

        tracing::debug!(
            "Read .bmf: {} materials, {} meshes, {} bytes",
            materials.len(),
            meshes.len(),
            self.bytes.len()
        );

        Ok(BmfDocument {
            materials,
            meshes,
            position,
            transform,
        })
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Take `len` bytes or fail with `Truncated`
    fn take(&mut self, what: &'static str, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(FormatError::Truncated {
                what,
                needed: len as u64,
                remaining: self.remaining() as u64,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_u64(&mut self, what: &'static str) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.take(what, 8)?))
    }

    /// Read a u64 element count, requiring at least `min_element_size` bytes per element
    fn read_count(&mut self, what: &'static str, min_element_size: usize) -> Result<usize> {
        let count = self.read_u64(what)?;
        self.ensure_available(what, count, min_element_size as u64)?;
        usize::try_from(count).map_err(|_| FormatError::CountTooLarge(count))
    }

    /// Fail unless `count * element_size` bytes remain
    fn ensure_available(&self, what: &'static str, count: u64, element_size: u64) -> Result<()> {
        let needed = count
            .checked_mul(element_size)
            .ok_or(FormatError::CountTooLarge(count))?;
        if needed > self.remaining() as u64 {
            return Err(FormatError::Truncated {
                what,
                needed,
                remaining: self.remaining() as u64,
            });
        }
        Ok(())
    }

    fn read_header<H: BinarySerializable>(&mut self, what: &'static str) -> Result<H> {
        let bytes = self.take(what, H::SIZE)?;
        // take() guarantees H::SIZE bytes
        H::deserialize(bytes).ok_or(FormatError::Truncated {
            what,
            needed: H::SIZE as u64,
            remaining: bytes.len() as u64,
        })
    }

    fn read_f32_array<const N: usize>(&mut self, what: &'static str) -> Result<[f32; N]> {
        let bytes = self.take(what, N * 4)?;
        let mut out = [0.0f32; N];
        LittleEndian::read_f32_into(bytes, &mut out);
        Ok(out)
    }

    fn read_material(&mut self) -> Result<MaterialRecord> {
        let header: MaterialHeader = self.read_header("material")?;
        let diffuse_path = self.read_path("diffuse path")?;
        let normal_path = self.read_path("normal path")?;
        Ok(MaterialRecord {
            header,
            diffuse_path,
            normal_path,
        })
    }

    /// Length-prefixed path; zero length means absent, otherwise the prefix is stripped
    fn read_path(&mut self, what: &'static str) -> Result<Option<String>> {
        let len = self.read_u64(what)?;
        if len == 0 {
            return Ok(None);
        }
        self.ensure_available(what, len, 1)?;
        let bytes = self.take(what, len as usize)?;
        let path = String::from_utf8(bytes.to_vec())?;
        match path.strip_prefix(PATH_PREFIX) {
            Some(stripped) => Ok(Some(stripped.to_owned())),
            None => Err(FormatError::MissingPathPrefix(path)),
        }
    }

    fn read_mesh(&mut self) -> Result<MeshRecord> {
        let header: MeshHeader = self.read_header("mesh header")?;
        let flags = header
            .attributes()
            .ok_or(FormatError::UnknownAttributeFlags(header.flags))?;

        let stride = vertex_stride(flags) as u64;
        self.ensure_available("vertex data", header.vertex_count, stride)?;
        let vertex_count = header.vertex_count as usize;

        let mut positions = Vec::with_capacity(vertex_count);
        let mut normals = Vec::new();
        let mut tangents = Vec::new();
        let mut uvs = Vec::new();
        if flags.contains(AttributeFlags::NORMAL) {
            normals.reserve_exact(vertex_count);
        }
        if flags.contains(AttributeFlags::TANGENT) {
            tangents.reserve_exact(vertex_count);
        }
        if flags.contains(AttributeFlags::UV) {
            uvs.reserve_exact(vertex_count);
        }

        for _ in 0..vertex_count {
            positions.push(self.read_f32_array::<3>("position")?);
            if flags.contains(AttributeFlags::NORMAL) {
                normals.push(self.read_f32_array::<3>("normal")?);
            }
            if flags.contains(AttributeFlags::TANGENT) {
                tangents.push(self.read_f32_array::<3>("tangent")?);
            }
            if flags.contains(AttributeFlags::UV) {
                uvs.push(self.read_f32_array::<2>("uv")?);
            }
        }

        self.ensure_available("index data", header.index_count, 4)?;
        let index_bytes = self.take("index data", header.index_count as usize * 4)?;
        let mut indices = vec![0u32; header.index_count as usize];
        LittleEndian::read_u32_into(index_bytes, &mut indices);

        Ok(MeshRecord {
            material_index: header.material_index,
            transform: header.transform,
            positions,
            normals,
            tangents,
            uvs,
            indices,
        })
    }
}

/// Smallest valid stream: no materials, no meshes, trailer only
pub const MIN_STREAM_SIZE: usize = 8 + 8 + TRAILER_SIZE;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::BmfWriter;

    fn sample_document() -> BmfDocument {
        BmfDocument {
            materials: vec![MaterialRecord {
                header: MaterialHeader {
                    diffuse: [0.8, 0.1, 0.1],
                    specular: [0.25; 3],
                    emissive: [0.0; 3],
                    shininess: 64.0,
                },
                diffuse_path: Some("textures/red.png".to_string()),
                normal_path: Some("textures/red_n.png".to_string()),
            }],
            meshes: vec![
                MeshRecord {
                    material_index: 0,
                    transform: glam::Mat4::IDENTITY.to_cols_array(),
                    positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                    normals: vec![[0.0, 0.0, 1.0]; 3],
                    tangents: vec![],
                    uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
                    indices: vec![0, 1, 2],
                },
                MeshRecord {
                    material_index: 0,
                    transform: glam::Mat4::from_translation(glam::Vec3::X).to_cols_array(),
                    positions: vec![[f32::MIN_POSITIVE, -0.0, 3.5]; 4],
                    normals: vec![],
                    tangents: vec![[1.0, 0.0, 0.0]; 4],
                    uvs: vec![],
                    indices: vec![0, 1, 2, 2, 3, 0],
                },
            ],
            position: [1.0, 2.0, 3.0],
            transform: glam::Mat4::from_scale(glam::Vec3::splat(0.1)).to_cols_array(),
        }
    }

    fn encode(doc: &BmfDocument) -> Vec<u8> {
        let mut buffer = Vec::new();
        BmfWriter::new(&mut buffer).write_document(doc).unwrap();
        buffer
    }

    #[test]
    fn test_roundtrip_mixed_attributes() {
        let doc = sample_document();
        let bytes = encode(&doc);
        let parsed = BmfReader::new(&bytes).read_document().unwrap();
        assert_eq!(parsed, doc);

        // -0.0 == 0.0 under PartialEq, so compare bytes for bit exactness
        assert_eq!(encode(&parsed), bytes);
        assert_eq!(parsed.meshes[1].positions[0][1].to_bits(), (-0.0f32).to_bits());
    }

    #[test]
    fn test_empty_stream_is_truncated() {
        let err = BmfReader::new(&[]).read_document().unwrap_err();
        assert!(matches!(err, FormatError::Truncated { .. }));
    }

    #[test]
    fn test_minimal_stream() {
        let doc = BmfDocument {
            materials: vec![],
            meshes: vec![],
            position: [0.0; 3],
            transform: [0.0; 16],
        };
        let bytes = encode(&doc);
        assert_eq!(bytes.len(), MIN_STREAM_SIZE);
        assert_eq!(BmfReader::new(&bytes).read_document().unwrap(), doc);
    }

    #[test]
    fn test_every_truncation_is_rejected() {
        let bytes = encode(&sample_document());
        for len in 0..bytes.len() {
            let result = BmfReader::new(&bytes[..len]).read_document();
            assert!(result.is_err(), "prefix of {} bytes decoded", len);
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode(&sample_document());
        bytes.push(0);
        let err = BmfReader::new(&bytes).read_document().unwrap_err();
        assert!(matches!(err, FormatError::TrailingBytes(1)));
    }

    #[test]
    fn test_huge_count_rejected_without_allocating() {
        let mut bytes = u64::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 16]);
        let err = BmfReader::new(&bytes).read_document().unwrap_err();
        assert!(matches!(
            err,
            FormatError::CountTooLarge(_) | FormatError::Truncated { .. }
        ));
    }

    #[test]
    fn test_missing_prefix_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&[0u8; MaterialHeader::SIZE]);
        bytes.extend_from_slice(&7u64.to_le_bytes());
        bytes.extend_from_slice(b"abc.png");
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(&[0u8; TRAILER_SIZE]);

        let err = BmfReader::new(&bytes).read_document().unwrap_err();
        assert!(matches!(err, FormatError::MissingPathPrefix(p) if p == "abc.png"));
    }

    #[test]
    fn test_unknown_flags_rejected() {
        let mut doc = sample_document();
        doc.meshes.truncate(1);
        let mut bytes = encode(&doc);
        let flags_at = bytes.len()
            - TRAILER_SIZE
            - (MeshHeader::SIZE + 3 * 32 + 3 * 4)
            + 24;
        bytes[flags_at] |= 0b1000_0000;
        let err = BmfReader::new(&bytes).read_document().unwrap_err();
        assert!(matches!(err, FormatError::UnknownAttributeFlags(_)));
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let mut doc = sample_document();
        doc.meshes.truncate(1);
        let mut bytes = encode(&doc);
        // last index is the final u32 before the trailer
        let idx_at = bytes.len() - TRAILER_SIZE - 4;
        bytes[idx_at..idx_at + 4].copy_from_slice(&3u32.to_le_bytes());
        let err = BmfReader::new(&bytes).read_document().unwrap_err();
        assert!(matches!(
            err,
            FormatError::IndexOutOfRange {
                mesh: 0,
                index: 3,
                vertex_count: 3
            }
        ));
    }
}
