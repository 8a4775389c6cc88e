use crate::core::attribute::AttributeKind;
use crate::shared::attribute::quantization::QuantizationParams;

/// The first two bytes of every stream.
pub const MAGIC: [u8; 2] = *b"DL";

pub const VERSION_MAJOR: u8 = 1;
pub const VERSION_MINOR: u8 = 0;

/// Set if the stream carries the map from the decoded point order to the original one.
pub const FLAG_POINT_ORDER_PRESERVED: u8 = 1;

/// Mask of the flags known to this version.
pub(crate) const KNOWN_FLAGS: u8 = FLAG_POINT_ORDER_PRESERVED;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "evaluation", derive(serde::Serialize))]
pub enum GeometryType {
    Mesh,
    PointCloud,
}

impl GeometryType {
    #[inline]
    pub(crate) fn get_id(&self) -> u8 {
        match self {
            Self::Mesh => 0,
            Self::PointCloud => 1,
        }
    }

    #[inline]
    pub(crate) fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Mesh),
            1 => Some(Self::PointCloud),
            _ => None,
        }
    }
}

/// An entry of the attribute manifest.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeDescriptor {
    pub kind: AttributeKind,
    pub quantization: QuantizationParams,
}

impl AttributeDescriptor {
    #[inline]
    pub fn num_components(&self) -> usize {
        self.quantization.num_components()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub version_major: u8,
    pub version_minor: u8,
    pub geometry_type: GeometryType,
    pub flags: u8,
    pub num_points: usize,
    pub num_faces: usize,
    pub attributes: Vec<AttributeDescriptor>,
}

impl Header {
    #[inline]
    pub fn is_point_order_preserved(&self) -> bool {
        self.flags & FLAG_POINT_ORDER_PRESERVED != 0
    }
}

/// The whole stream split into its parts. The sections are opaque byte strings here;
/// framing only adds the header and the length prefixes.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub header: Header,

    /// Present if and only if the geometry is a mesh.
    pub connectivity: Option<Vec<u8>>,

    /// Present if and only if the point order is preserved.
    pub point_map: Option<Vec<u8>>,

    /// One section per entry of the attribute manifest, in the same order.
    pub attributes: Vec<Vec<u8>>,
}
