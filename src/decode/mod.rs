pub mod attribute;
pub mod connectivity;
pub mod header;

use thiserror::Error;

use crate::core::attribute::Attribute;
use crate::core::bit_coder::{ReaderErr, SliceReader};
use crate::core::corner_table::CornerTable;
use crate::core::mesh::Mesh;
use crate::core::shared::{ConfigType, PointIdx};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Streams declaring more points are rejected before anything is allocated for them.
    pub max_num_points: usize,
    pub max_num_faces: usize,
    /// Bound on the number of floats the attributes hold together, i.e. the sum of
    /// `num_points * num_components` over the attributes.
    pub max_num_values: usize,
}

impl ConfigType for Config {
    fn default() -> Self {
        Self {
            max_num_points: 1 << 26,
            max_num_faces: 1 << 26,
            max_num_values: 1 << 28,
        }
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Attribute decoding error: {0}")]
    AttributeError(#[from] attribute::Err),
    #[error("Corrupt connectivity: {0}")]
    CorruptStream(#[from] connectivity::Err),
    #[error("Format error: {0}")]
    FormatError(header::Err),
    #[error("{what} is {value}, but the limit is {limit}")]
    LimitExceeded { what: &'static str, value: u64, limit: u64 },
    #[error("Not a draco-lite stream")]
    NotADracoLiteStream,
    #[error("{len} bytes of the {section} section are left unread")]
    SectionNotConsumed { section: &'static str, len: usize },
    #[error("Unexpected end of stream at offset {offset}: {requested} more bytes requested")]
    UnexpectedEndOfStream { offset: usize, requested: usize },
    #[error("Unsupported version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },
}

impl From<header::Err> for Err {
    fn from(err: header::Err) -> Self {
        match err {
            header::Err::ReaderError(ReaderErr::NotEnoughData { offset, requested }) => {
                Self::UnexpectedEndOfStream { offset, requested }
            }
            header::Err::NotADracoLiteStream => Self::NotADracoLiteStream,
            header::Err::UnsupportedVersion { major, minor } => Self::UnsupportedVersion { major, minor },
            header::Err::LimitExceeded { what, value, limit } => Self::LimitExceeded { what, value, limit },
            err => Self::FormatError(err),
        }
    }
}

fn check_consumed(reader: &SliceReader<'_>, section: &'static str) -> Result<(), Err> {
    if reader.is_empty() {
        Ok(())
    } else {
        Err(Err::SectionNotConsumed { section, len: reader.remaining() })
    }
}

/// Decodes a stream into a mesh. Points are numbered in the order the connectivity decoder
/// creates them, unless the stream preserves the point order of the encoded mesh.
pub fn decode(data: &[u8], cfg: &Config) -> Result<Mesh, Err> {
    let frame = header::unframe(data, cfg)?;
    let header = &frame.header;
    let num_points = header.num_points;
    log::debug!(
        "decoding {:?}: {} points, {} faces, {} attributes",
        header.geometry_type,
        num_points,
        header.num_faces,
        header.attributes.len()
    );

    let (mut faces, table) = match &frame.connectivity {
        Some(section) => {
            let mut reader = SliceReader::new(section);
            let decoded = connectivity::decode_connectivity(&mut reader, header.num_faces)?;
            check_consumed(&reader, "connectivity")?;
            if decoded.num_vertices > num_points {
                return Err(connectivity::Err::VertexCountMismatch {
                    expected: num_points,
                    actual: decoded.num_vertices,
                }.into());
            }
            let table = CornerTable::new(&decoded.faces, num_points)
                .map_err(connectivity::Err::from)?;
            (decoded.faces, Some(table))
        }
        None => (Vec::new(), None),
    };

    let mut attributes = Vec::with_capacity(header.attributes.len());
    for (descriptor, section) in header.attributes.iter().zip(&frame.attributes) {
        let mut reader = SliceReader::new(section);
        let att = attribute::decode_attribute(&mut reader, descriptor, num_points, table.as_ref())?;
        check_consumed(&reader, "attribute")?;
        attributes.push(att);
    }

    if let Some(section) = &frame.point_map {
        let mut reader = SliceReader::new(section);
        let point_order = connectivity::read_point_map(&mut reader, num_points)?;
        check_consumed(&reader, "point map")?;
        restore_point_order(&point_order, &mut faces, &mut attributes);
    }

    Ok(Mesh { faces, attributes, num_points })
}

/// Renumbers the points so that the decoded point `i` becomes the point `point_order[i]`.
fn restore_point_order(
    point_order: &[PointIdx],
    faces: &mut [[PointIdx; 3]],
    attributes: &mut [Attribute],
) {
    for face in faces.iter_mut() {
        for v in face.iter_mut() {
            *v = point_order[*v];
        }
    }
    for att in attributes.iter_mut() {
        att.reorder_points(point_order);
    }
}
