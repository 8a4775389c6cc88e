use crate::core::bit_coder::ByteWriter;
use crate::debug_write;
use crate::shared::header::{Frame, Header, MAGIC};
use crate::utils::bit_coder::leb128_write;

pub fn write_header<W>(header: &Header, writer: &mut W)
    where W: ByteWriter
{
    writer.write_bytes(&MAGIC);
    writer.write_u8(header.version_major);
    writer.write_u8(header.version_minor);
    writer.write_u8(header.geometry_type.get_id());
    writer.write_u8(header.flags);
    leb128_write(header.num_points as u64, writer);
    leb128_write(header.num_faces as u64, writer);

    writer.write_u8(header.attributes.len() as u8);
    for att in &header.attributes {
        att.kind.write_to(writer);
        writer.write_u8(att.num_components() as u8);
        att.quantization.write_to(writer);
    }
}

/// Writes the header and then every section, each prefixed by its length.
pub fn frame<W>(frame: &Frame, writer: &mut W)
    where W: ByteWriter
{
    write_header(&frame.header, writer);
    debug_write!("HEADER END", writer);

    let sections = frame.connectivity.iter()
        .chain(frame.point_map.iter())
        .chain(frame.attributes.iter());
    for section in sections {
        leb128_write(section.len() as u64, writer);
        writer.write_bytes(section);
        debug_write!("SECTION END", writer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::AttributeKind;
    use crate::shared::attribute::quantization::QuantizationParams;
    use crate::shared::header::{AttributeDescriptor, GeometryType, VERSION_MAJOR, VERSION_MINOR};

    #[test]
    fn test_header_layout() {
        let header = Header {
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            geometry_type: GeometryType::PointCloud,
            flags: 0,
            num_points: 200,
            num_faces: 0,
            attributes: vec![AttributeDescriptor {
                kind: AttributeKind::Generic(5),
                quantization: QuantizationParams::new(8, vec![1.0], vec![1.5]).unwrap(),
            }],
        };
        let mut buffer = Vec::new();
        write_header(&header, &mut buffer);
        let mut expected = vec![b'D', b'L', 1, 0, 1, 0, 0xC8, 0x01, 0, 1, 4, 5, 1, 8];
        expected.extend_from_slice(&1.0_f32.to_le_bytes());
        expected.extend_from_slice(&1.5_f32.to_le_bytes());
        assert_eq!(buffer, expected);
    }
}
