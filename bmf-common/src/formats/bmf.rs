//! Binary model file format (.bmf)
//!
//! POD format - no magic bytes, no version field. All integers are
//! little-endian; floats are stored bit-exact.
//!
//! # Layout
//! ```text
//! u64 material_count
//! material_count × {
//!   0x00: diffuse f32×3
//!   0x0C: specular f32×3
//!   0x18: emissive f32×3
//!   0x24: shininess f32                       (40 bytes)
//!   u64 len; u8[len] diffuse path             ("models/" + path, 0 => absent)
//!   u64 len; u8[len] normal path
//! }
//! u64 mesh_count
//! mesh_count × {
//!   0x00: material_index u64
//!   0x08: vertex_count u64
//!   0x10: index_count u64
//!   0x18: flags u8 (AttributeFlags)
//!   0x19: transform f32×16, column-major      (89 bytes)
//!   vertex_count × { position f32×3 [normal f32×3] [tangent f32×3] [uv f32×2] }
//!   index_count × u32
//! }
//! scene position f32×3
//! scene transform f32×16, column-major
//! ```
//!
//! Array position is identity: mesh order and material order are not
//! recorded anywhere else, so an encoder/decoder pair must agree on them.

use crate::vertex::AttributeFlags;

/// Extension of scene asset files
pub const BMF_EXT: &str = "bmf";

/// Prefix stored in front of every non-empty texture path
///
/// Paths are expected relative to the model directory. An absolute path is
/// stored as given, so `/tex/a.png` is written as `models//tex/a.png` and
/// reads back unchanged.
pub const PATH_PREFIX: &str = "models/";

/// Smallest possible encoded material (fixed block + two empty strings)
pub const MIN_MATERIAL_SIZE: usize = MaterialHeader::SIZE + 8 + 8;

/// Scene trailer size (origin + transform)
pub const TRAILER_SIZE: usize = 3 * 4 + 16 * 4;

/// Fixed-size part of a material record (40 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct MaterialHeader {
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub emissive: [f32; 3],
    pub shininess: f32,
}

impl MaterialHeader {
    pub const SIZE: usize = 40;

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        let floats = self
            .diffuse
            .iter()
            .chain(&self.specular)
            .chain(&self.emissive)
            .chain(std::iter::once(&self.shininess));
        for (chunk, f) in bytes.chunks_exact_mut(4).zip(floats) {
            chunk.copy_from_slice(&f.to_le_bytes());
        }
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let f = |i: usize| read_f32(&bytes[i * 4..]);
        Some(Self {
            diffuse: [f(0), f(1), f(2)],
            specular: [f(3), f(4), f(5)],
            emissive: [f(6), f(7), f(8)],
            shininess: f(9),
        })
    }
}

/// Fixed-size part of a mesh record (89 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHeader {
    pub material_index: u64,
    pub vertex_count: u64,
    pub index_count: u64,
    /// Raw flag byte; unknown bits are rejected by the reader
    pub flags: u8,
    pub transform: [f32; 16],
}

impl MeshHeader {
    pub const SIZE: usize = 89;

    pub fn attributes(&self) -> Option<AttributeFlags> {
        AttributeFlags::from_bits(self.flags)
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.material_index.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.vertex_count.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.index_count.to_le_bytes());
        bytes[24] = self.flags;
        for (chunk, f) in bytes[25..].chunks_exact_mut(4).zip(&self.transform) {
            chunk.copy_from_slice(&f.to_le_bytes());
        }
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut transform = [0.0f32; 16];
        for (i, f) in transform.iter_mut().enumerate() {
            *f = read_f32(&bytes[25 + i * 4..]);
        }
        Some(Self {
            material_index: read_u64(&bytes[0..]),
            vertex_count: read_u64(&bytes[8..]),
            index_count: read_u64(&bytes[16..]),
            flags: bytes[24],
            transform,
        })
    }
}

/// One material as stored in the file (paths without the prefix)
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecord {
    pub header: MaterialHeader,
    pub diffuse_path: Option<String>,
    pub normal_path: Option<String>,
}

/// One mesh as stored in the file
///
/// Optional attribute arrays are either empty or exactly as long as
/// `positions`; a non-empty array sets the matching [`AttributeFlags`] bit.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRecord {
    pub material_index: u64,
    pub transform: [f32; 16],
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tangents: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshRecord {
    pub fn attributes(&self) -> AttributeFlags {
        let mut flags = AttributeFlags::empty();
        flags.set(AttributeFlags::NORMAL, !self.normals.is_empty());
        flags.set(AttributeFlags::TANGENT, !self.tangents.is_empty());
        flags.set(AttributeFlags::UV, !self.uvs.is_empty());
        flags
    }

    pub fn header(&self) -> MeshHeader {
        MeshHeader {
            material_index: self.material_index,
            vertex_count: self.positions.len() as u64,
            index_count: self.indices.len() as u64,
            flags: self.attributes().bits(),
            transform: self.transform,
        }
    }

    /// Check attribute lengths and index bounds
    pub(crate) fn validate(&self, mesh: usize, material_count: usize) -> crate::Result<()> {
        let vertex_count = self.positions.len();
        for (attribute, len) in [
            ("normals", self.normals.len()),
            ("tangents", self.tangents.len()),
            ("uvs", self.uvs.len()),
        ] {
            if len != 0 && len != vertex_count {
                return Err(crate::FormatError::AttributeLength {
                    mesh,
                    attribute,
                    len,
                    vertex_count,
                });
            }
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(crate::FormatError::IndexOutOfRange {
                mesh,
                index,
                vertex_count,
            });
        }
        if self.material_index >= material_count as u64 {
            return Err(crate::FormatError::MaterialOutOfRange {
                mesh,
                material_index: self.material_index,
                material_count,
            });
        }
        Ok(())
    }
}

/// Complete contents of a `.bmf` file
#[derive(Debug, Clone, PartialEq)]
pub struct BmfDocument {
    pub materials: Vec<MaterialRecord>,
    pub meshes: Vec<MeshRecord>,
    pub position: [f32; 3],
    pub transform: [f32; 16],
}

impl BmfDocument {
    /// Check every mesh against the material list
    pub fn validate(&self) -> crate::Result<()> {
        self.meshes
            .iter()
            .enumerate()
            .try_for_each(|(i, mesh)| mesh.validate(i, self.materials.len()))
    }

    /// Exact encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        let materials: usize = self
            .materials
            .iter()
            .map(|m| {
                MIN_MATERIAL_SIZE
                    + prefixed_len(m.diffuse_path.as_deref())
                    + prefixed_len(m.normal_path.as_deref())
            })
            .sum();
        let meshes: usize = self
            .meshes
            .iter()
            .map(|m| {
                MeshHeader::SIZE
                    + m.positions.len() * crate::vertex_stride(m.attributes())
                    + m.indices.len() * 4
            })
            .sum();
        8 + materials + 8 + meshes + TRAILER_SIZE
    }
}

fn prefixed_len(path: Option<&str>) -> usize {
    path.map_or(0, |p| PATH_PREFIX.len() + p.len())
}

fn read_f32(bytes: &[u8]) -> f32 {
    f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(b)
}
