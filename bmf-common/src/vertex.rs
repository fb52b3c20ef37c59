//! Vertex layout and per-mesh attribute flags
//!
//! [`Vertex`] is the interleaved record handed to the renderer (position + UV,
//! 20 bytes). [`AttributeFlags`] describes which optional attribute groups a
//! mesh record carries in a `.bmf` stream; the per-vertex stride of a mesh
//! follows from its flags alone.

use bytemuck::{Pod, Zeroable};

/// Interleaved vertex: position (x, y, z) and texture coordinate (u, v)
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const SIZE: usize = 20;

    pub const fn new(x: f32, y: f32, z: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y, z],
            uv: [u, v],
        }
    }

    /// Vertex at `position` with the UV set to (0, 0)
    pub const fn from_position(position: [f32; 3]) -> Self {
        Self {
            position,
            uv: [0.0, 0.0],
        }
    }

    /// Bit-exact comparison (distinguishes -0.0 from 0.0 and compares NaN payloads)
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.position
            .iter()
            .chain(self.uv.iter())
            .zip(other.position.iter().chain(other.uv.iter()))
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

bitflags::bitflags! {
    /// Optional vertex attribute groups present in a mesh record
    ///
    /// Position is always present. Stored as a single byte in the mesh header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttributeFlags: u8 {
        /// Normal (3 × f32)
        const NORMAL = 0b0000_0001;
        /// Tangent (3 × f32)
        const TANGENT = 0b0000_0010;
        /// First UV channel (2 × f32)
        const UV = 0b0000_0100;
    }
}

/// Calculate the per-vertex stride in bytes for a mesh record with `flags`
///
/// Attribute order inside a vertex: position → normal → tangent → UV.
#[inline]
pub const fn vertex_stride(flags: AttributeFlags) -> usize {
    let mut stride = 12; // Position: Float32x3

    if flags.contains(AttributeFlags::NORMAL) {
        stride += 12; // Float32x3
    }
    if flags.contains(AttributeFlags::TANGENT) {
        stride += 12; // Float32x3
    }
    if flags.contains(AttributeFlags::UV) {
        stride += 8; // Float32x2
    }

    stride
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), Vertex::SIZE);
        let v = Vertex::new(1.0, 2.0, 3.0, 0.25, 0.75);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(&bytes[12..16], &0.25f32.to_ne_bytes());
    }

    #[test]
    fn test_vertex_stride() {
        assert_eq!(vertex_stride(AttributeFlags::empty()), 12);
        assert_eq!(vertex_stride(AttributeFlags::UV), 20);
        assert_eq!(vertex_stride(AttributeFlags::NORMAL), 24);
        assert_eq!(
            vertex_stride(AttributeFlags::NORMAL | AttributeFlags::TANGENT),
            36
        );
        assert_eq!(vertex_stride(AttributeFlags::all()), 44);
    }

    #[test]
    fn test_bits_eq_distinguishes_signed_zero() {
        let a = Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0);
        let b = Vertex::new(-0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(a, b);
        assert!(!a.bits_eq(&b));
        assert!(a.bits_eq(&a));
    }
}
