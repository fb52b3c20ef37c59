//! Binary serialization trait for fixed-size record headers.
//!
//! Both fixed blocks of the `.bmf` format implement `BinarySerializable` so
//! the reader can pull any of them off the stream with one bounds-checked
//! helper, while each header keeps its type-specific `to_bytes()` returning a
//! fixed-size array.

/// Trait for binary-serializable fixed-size headers.
///
/// # Example
///
/// ```
/// use bmf_common::formats::{BinarySerializable, MaterialHeader};
///
/// let header = MaterialHeader {
///     diffuse: [1.0, 1.0, 1.0],
///     specular: [0.0; 3],
///     emissive: [0.0; 3],
///     shininess: 16.0,
/// };
///
/// let bytes = header.serialize();
/// let parsed = MaterialHeader::deserialize(&bytes).unwrap();
/// assert_eq!(parsed, header);
/// ```
pub trait BinarySerializable: Sized {
    /// Size of the serialized header in bytes.
    const SIZE: usize;

    /// Serialize to bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Deserialize from bytes.
    ///
    /// Returns `None` if the byte slice is too short.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

impl BinarySerializable for super::MaterialHeader {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

impl BinarySerializable for super::MeshHeader {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}
