use thiserror::Error;

use crate::core::bit_coder::{ByteReader, ByteWriter, ReaderErr};
use crate::core::shared::PointIdx;
use crate::utils::bit_coder::{leb128_read, leb128_write};

/// The largest number of components an attribute can have.
pub const MAX_NUM_COMPONENTS: usize = 16;

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("{kind:?} attribute has {actual} values, but {expected} were expected ({num_components} per point)")]
    AttributeLengthMismatch {
        kind: AttributeKind,
        num_components: usize,
        expected: usize,
        actual: usize,
    },
    #[error("{kind:?} attribute has {num_components} components; it must have 1 to {MAX_NUM_COMPONENTS}")]
    InvalidComponentCount { kind: AttributeKind, num_components: usize },
    #[error("Invalid quantization bits {bits} for {kind:?}; it must be in 1..=30")]
    InvalidQuantizationBits { kind: AttributeKind, bits: u8 },
    #[error("{kind:?} attribute has a non-finite value {value} at point {point}, component {component}")]
    NonFiniteValue {
        kind: AttributeKind,
        point: PointIdx,
        component: usize,
        value: f32,
    },
    #[error("Reader error: {0}")]
    ReaderError(#[from] ReaderErr),
    #[error("Unknown attribute kind id: {0}")]
    UnknownKind(u8),
}

/// Kind of an attribute. Besides the well-known kinds, any number of
/// application defined attributes can be carried with [AttributeKind::Generic].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "evaluation", derive(serde::Serialize))]
pub enum AttributeKind {
    Position,
    Normal,
    Color,
    TexCoord,
    /// Application defined attribute, identified by an opaque id.
    Generic(u32),
}

impl AttributeKind {
    #[inline]
    pub(crate) fn get_id(&self) -> u8 {
        match self {
            Self::Position => 0,
            Self::Normal => 1,
            Self::Color => 2,
            Self::TexCoord => 3,
            Self::Generic(_) => 4,
        }
    }

    /// Writes the kind tag, followed by the generic id for [AttributeKind::Generic].
    pub(crate) fn write_to<W: ByteWriter>(&self, writer: &mut W) {
        writer.write_u8(self.get_id());
        if let Self::Generic(id) = self {
            leb128_write(*id as u64, writer);
        }
    }

    pub(crate) fn read_from<R: ByteReader>(reader: &mut R) -> Result<Self, Err> {
        let out = match reader.read_u8()? {
            0 => Self::Position,
            1 => Self::Normal,
            2 => Self::Color,
            3 => Self::TexCoord,
            4 => {
                let id = leb128_read(reader)?;
                Self::Generic(u32::try_from(id).map_err(|_| Err::UnknownKind(4))?)
            }
            id => return Err(Err::UnknownKind(id)),
        };
        Ok(out)
    }
}

/// Per-point values of one kind, stored as a flat array of `num_components` floats per point.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    kind: AttributeKind,
    num_components: usize,
    values: Vec<f32>,

    /// Overrides the bit depth of the encoder configuration for this attribute.
    quantization_bits: Option<u8>,
}

impl Attribute {
    /// Creates an attribute from a flat array of values. Nothing is validated here;
    /// the mesh builder checks the attribute against the rest of the mesh.
    pub fn new(kind: AttributeKind, num_components: usize, values: Vec<f32>) -> Self {
        Self {
            kind,
            num_components,
            values,
            quantization_bits: None,
        }
    }

    /// Creates an attribute from fixed size vectors, e.g. `[f32; 3]` for positions.
    pub fn from_vectors<const N: usize>(kind: AttributeKind, data: &[[f32; N]]) -> Self {
        Self::new(kind, N, data.iter().flatten().copied().collect())
    }

    pub fn with_quantization_bits(mut self, bits: u8) -> Self {
        self.quantization_bits = Some(bits);
        self
    }

    #[inline]
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    #[inline]
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    #[inline]
    pub fn quantization_bits(&self) -> Option<u8> {
        self.quantization_bits
    }

    /// Number of points the attribute holds values for.
    #[inline]
    pub fn len(&self) -> usize {
        if self.num_components == 0 {
            0
        } else {
            self.values.len() / self.num_components
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Returns the value of the point, or `None` if the point is out of range.
    #[inline]
    pub fn get(&self, point: PointIdx) -> Option<&[f32]> {
        let start = point.checked_mul(self.num_components)?;
        self.values.get(start..start + self.num_components)
    }

    /// Iterates over the values point by point.
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(self.num_components.max(1))
    }

    /// Moves the value of point `i` to point `point_order[i]`. `point_order` must be a permutation.
    pub(crate) fn reorder_points(&mut self, point_order: &[PointIdx]) {
        let n = self.num_components;
        let mut values = vec![0.0; self.values.len()];
        for (value, &p) in self.values.chunks_exact(n).zip(point_order) {
            values[p * n..(p + 1) * n].copy_from_slice(value);
        }
        self.values = values;
    }

    /// Checks that the attribute holds exactly one finite value per point.
    pub(crate) fn validate(&self, num_points: usize) -> Result<(), Err> {
        if self.num_components == 0 || self.num_components > MAX_NUM_COMPONENTS {
            return Err(Err::InvalidComponentCount {
                kind: self.kind,
                num_components: self.num_components,
            });
        }
        if let Some(bits) = self.quantization_bits {
            if !(1..=30).contains(&bits) {
                return Err(Err::InvalidQuantizationBits { kind: self.kind, bits });
            }
        }
        let expected = num_points * self.num_components;
        if self.values.len() != expected {
            return Err(Err::AttributeLengthMismatch {
                kind: self.kind,
                num_components: self.num_components,
                expected,
                actual: self.values.len(),
            });
        }
        if let Some(i) = self.values.iter().position(|v| !v.is_finite()) {
            return Err(Err::NonFiniteValue {
                kind: self.kind,
                point: i / self.num_components,
                component: i % self.num_components,
                value: self.values[i],
            });
        }
        Ok(())
    }
}
