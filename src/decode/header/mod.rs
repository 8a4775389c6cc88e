use std::collections::HashSet;

use thiserror::Error;

use crate::core::attribute::{self, AttributeKind, MAX_NUM_COMPONENTS};
use crate::core::bit_coder::{ByteReader, ReaderErr, SliceReader};
use crate::debug_expect;
use crate::shared::attribute::quantization::{self, QuantizationParams};
use crate::shared::header::{
    AttributeDescriptor, Frame, GeometryType, Header, KNOWN_FLAGS, MAGIC, VERSION_MAJOR, VERSION_MINOR,
};
use crate::utils::bit_coder::leb128_read;

use super::Config;

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Attribute manifest error: {0}")]
    AttributeError(attribute::Err),
    #[error("Debug marker mismatch at offset {0}")]
    DebugMarkerMismatch(usize),
    #[error("Attribute {0:?} appears twice in the manifest")]
    DuplicateAttribute(AttributeKind),
    #[error("Mesh stream declares no faces")]
    EmptyMesh,
    #[error("{kind:?} attribute has {num_components} components; it must have 1 to {MAX_NUM_COMPONENTS}")]
    InvalidComponentCount { kind: AttributeKind, num_components: usize },
    #[error("{what} is {value}, but the limit is {limit}")]
    LimitExceeded { what: &'static str, value: u64, limit: u64 },
    #[error("Not a draco-lite stream")]
    NotADracoLiteStream,
    #[error("Point cloud stream declares {0} faces")]
    PointCloudWithFaces(usize),
    #[error("Invalid quantization parameters: {0}")]
    QuantizationError(quantization::Err),
    #[error("Reader error: {0}")]
    ReaderError(#[from] ReaderErr),
    #[error("{len} unexpected bytes after the last section at offset {offset}")]
    TrailingBytes { offset: usize, len: usize },
    #[error("Unknown flags: {0:#010b}")]
    UnknownFlags(u8),
    #[error("Unknown geometry type: {0}")]
    UnknownGeometryType(u8),
    #[error("Unsupported version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },
}

impl From<attribute::Err> for Err {
    fn from(err: attribute::Err) -> Self {
        match err {
            attribute::Err::ReaderError(r) => Self::ReaderError(r),
            err => Self::AttributeError(err),
        }
    }
}

impl From<quantization::Err> for Err {
    fn from(err: quantization::Err) -> Self {
        match err {
            quantization::Err::ReaderError(r) => Self::ReaderError(r),
            err => Self::QuantizationError(err),
        }
    }
}

fn check_limit(what: &'static str, value: u64, limit: usize) -> Result<usize, Err> {
    if value > limit as u64 {
        return Err(Err::LimitExceeded { what, value, limit: limit as u64 });
    }
    Ok(value as usize)
}

pub fn read_header<R>(reader: &mut R, cfg: &Config) -> Result<Header, Err>
    where R: ByteReader
{
    let mut magic = [0; 2];
    for m in magic.iter_mut() {
        *m = reader.read_u8()?;
    }
    if magic != MAGIC {
        return Err(Err::NotADracoLiteStream);
    }
    let version_major = reader.read_u8()?;
    let version_minor = reader.read_u8()?;
    if (version_major, version_minor) != (VERSION_MAJOR, VERSION_MINOR) {
        return Err(Err::UnsupportedVersion { major: version_major, minor: version_minor });
    }

    let geometry_id = reader.read_u8()?;
    let geometry_type = GeometryType::from_id(geometry_id).ok_or(Err::UnknownGeometryType(geometry_id))?;
    let flags = reader.read_u8()?;
    if flags & !KNOWN_FLAGS != 0 {
        return Err(Err::UnknownFlags(flags));
    }

    let num_points = check_limit("number of points", leb128_read(reader)?, cfg.max_num_points)?;
    let num_faces = check_limit("number of faces", leb128_read(reader)?, cfg.max_num_faces)?;
    match geometry_type {
        GeometryType::PointCloud if num_faces > 0 => return Err(Err::PointCloudWithFaces(num_faces)),
        GeometryType::Mesh if num_faces == 0 => return Err(Err::EmptyMesh),
        _ => {}
    }

    let num_attributes = reader.read_u8()?;
    let mut attributes = Vec::with_capacity(num_attributes as usize);
    let mut seen = HashSet::new();
    let mut num_values = 0_u64;
    for _ in 0..num_attributes {
        let kind = AttributeKind::read_from(reader)?;
        if !seen.insert(kind) {
            return Err(Err::DuplicateAttribute(kind));
        }
        let num_components = reader.read_u8()? as usize;
        if num_components == 0 || num_components > MAX_NUM_COMPONENTS {
            return Err(Err::InvalidComponentCount { kind, num_components });
        }
        num_values = num_values.saturating_add((num_points as u64).saturating_mul(num_components as u64));
        check_limit("number of attribute values", num_values, cfg.max_num_values)?;
        let quantization = QuantizationParams::read_from(reader, num_components)?;
        attributes.push(AttributeDescriptor { kind, quantization });
    }

    Ok(Header {
        version_major,
        version_minor,
        geometry_type,
        flags,
        num_points,
        num_faces,
        attributes,
    })
}

/// Splits the stream into the header and its sections. Only the header is interpreted;
/// the sections are checked to fit in the stream and to cover it exactly.
pub fn unframe(data: &[u8], cfg: &Config) -> Result<Frame, Err> {
    let mut reader = SliceReader::new(data);
    let header = read_header(&mut reader, cfg)?;
    debug_expect!("HEADER END", &mut reader, Err::DebugMarkerMismatch(reader.position()));

    let connectivity = if header.geometry_type == GeometryType::Mesh {
        Some(read_section(&mut reader)?)
    } else {
        None
    };
    let point_map = if header.is_point_order_preserved() {
        Some(read_section(&mut reader)?)
    } else {
        None
    };
    let attributes = header.attributes.iter()
        .map(|_| read_section(&mut reader))
        .collect::<Result<Vec<_>, _>>()?;

    if !reader.is_empty() {
        return Err(Err::TrailingBytes {
            offset: reader.position(),
            len: reader.remaining(),
        });
    }
    Ok(Frame { header, connectivity, point_map, attributes })
}

fn read_section(reader: &mut SliceReader<'_>) -> Result<Vec<u8>, Err> {
    let len = leb128_read(reader)?;
    let data = reader.read_slice(usize::try_from(len).unwrap_or(usize::MAX))?;
    debug_expect!("SECTION END", &mut *reader, Err::DebugMarkerMismatch(reader.position()));
    Ok(data.to_vec())
}
