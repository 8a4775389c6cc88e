// lib.rs

/// Contains the shared definitions, native objects, the bit coder and the corner table.
pub mod core;

/// Contains definitions used by both the encoder and the decoder.
pub mod shared;

/// Defines the mesh encoder.
pub mod encode;

/// Defines the mesh decoder.
pub mod decode;

/// Contains the macros and small helpers used by the encoder and the decoder.
pub(crate) mod utils;

/// Evaluation module reports how the encoded bytes are distributed over the stream.
/// This functionality is most often used in the development and testing phase.
#[cfg(feature = "evaluation")]
pub mod eval;

use crate::core::shared::ConfigType;

pub use crate::core::mesh::Mesh;

/// Error returned by [encode_mesh].
pub type EncodeError = encode::Err;

/// Error returned by [decode_stream].
pub type DecodeError = decode::Err;

/// An immutable encoded byte stream. It is self-describing, i.e. a decoder needs
/// nothing but these bytes to reconstruct the mesh.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncodedStream {
    data: Box<[u8]>,
}

impl EncodedStream {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        Self { data: data.into_boxed_slice() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data.into_vec()
    }
}

impl AsRef<[u8]> for EncodedStream {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Encodes the mesh with the default configuration.
pub fn encode_mesh(mesh: &Mesh) -> Result<EncodedStream, EncodeError> {
    let mut writer = Vec::new();
    encode::encode(mesh, &mut writer, &encode::Config::default())?;
    Ok(EncodedStream::new(writer))
}

/// Decodes a stream produced by [encode_mesh] (or [encode::encode]) with the default configuration.
/// The attribute values are reconstructed within the quantization error; see [shared::attribute::quantization].
pub fn decode_stream(data: &[u8]) -> Result<Mesh, DecodeError> {
    decode::decode(data, &decode::Config::default())
}


/// Contains the most commonly used traits, types, and objects.
pub mod prelude {
    pub use crate::core::attribute::{Attribute, AttributeKind};
    pub use crate::core::mesh::{Mesh, builder::MeshBuilder};
    pub use crate::core::shared::{ConfigType, PointIdx, FaceIdx};
    pub use crate::core::bit_coder::{
        BitReader,
        BitWriter,
        ByteReader,
        ByteWriter,
        SliceReader,
    };
    pub use crate::encode::{self, encode};
    pub use crate::decode::{self, decode};
    pub use crate::{encode_mesh, decode_stream, EncodedStream, EncodeError, DecodeError};
}
