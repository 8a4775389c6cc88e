use serde::Serialize;

use crate::core::attribute::AttributeKind;
use crate::core::mesh::Mesh;
use crate::encode::{self, encode_frame};
use crate::shared::header::GeometryType;
use crate::utils::bit_coder::leb128_write;
use crate::EncodedStream;

/// How the bytes of an encoded stream are spent.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EncodingReport {
    pub total_bytes: usize,
    pub header_bytes: usize,

    /// Section sizes include their length prefixes.
    pub connectivity_bytes: usize,
    pub point_map_bytes: usize,
    pub attributes: Vec<AttributeReport>,

    pub geometry_type: Option<GeometryType>,
    pub num_points: usize,
    pub num_faces: usize,

    /// Number of `C`, `S`, `L`, `R` and `E` symbols, in that order.
    pub symbol_histogram: [usize; 5],
    pub num_topology_splits: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributeReport {
    pub kind: AttributeKind,
    pub num_components: usize,
    pub quantization_bits: u8,
    pub bytes: usize,
}

impl EncodingReport {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn section_size(section: &[u8]) -> usize {
    let mut prefix = Vec::new();
    leb128_write(section.len() as u64, &mut prefix);
    prefix.len() + section.len()
}

/// Encodes the mesh like [encode::encode] does, and reports the size of every part of the stream.
pub fn encode_with_report(mesh: &Mesh, cfg: &encode::Config) -> Result<(EncodedStream, EncodingReport), encode::Err> {
    let mut symbol_histogram = [0; 5];
    let mut num_topology_splits = 0;
    let frame = encode_frame(mesh, cfg, |encoded| {
        for symbol in &encoded.symbols {
            symbol_histogram[symbol.get_id()] += 1;
        }
        num_topology_splits = encoded.num_topology_splits;
    })?;
    let mut data = Vec::new();
    encode::header::frame(&frame, &mut data);

    let mut header = Vec::new();
    encode::header::write_header(&frame.header, &mut header);

    let mut report = EncodingReport {
        total_bytes: data.len(),
        header_bytes: header.len(),
        connectivity_bytes: frame.connectivity.as_deref().map_or(0, section_size),
        point_map_bytes: frame.point_map.as_deref().map_or(0, section_size),
        geometry_type: Some(frame.header.geometry_type),
        num_points: frame.header.num_points,
        num_faces: frame.header.num_faces,
        symbol_histogram,
        num_topology_splits,
        ..EncodingReport::default()
    };
    for (descriptor, section) in frame.header.attributes.iter().zip(&frame.attributes) {
        report.attributes.push(AttributeReport {
            kind: descriptor.kind,
            num_components: descriptor.num_components(),
            quantization_bits: descriptor.quantization.bits(),
            bytes: section_size(section),
        });
    }
    log::debug!("{}", report.to_json());
    Ok((EncodedStream::new(data), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::builder::MeshBuilder;
    use crate::core::shared::ConfigType;

    #[test]
    fn test_report_adds_up() {
        let mut builder = MeshBuilder::new();
        builder
            .add_vectors(AttributeKind::Position, &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
            .add_vectors(AttributeKind::Color, &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0, 1.0]])
            .set_faces(vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]]);
        let mesh = builder.build().unwrap();
        let (stream, report) = encode_with_report(&mesh, &encode::Config::default()).unwrap();

        #[cfg(not(feature = "debug_format"))]
        let sections = report.connectivity_bytes
            + report.point_map_bytes
            + report.attributes.iter().map(|a| a.bytes).sum::<usize>();
        #[cfg(not(feature = "debug_format"))]
        assert_eq!(report.header_bytes + sections, stream.len());
        assert_eq!(report.symbol_histogram.iter().sum::<usize>(), 3);
        assert_eq!(report.attributes[1].quantization_bits, 8);
        assert_eq!(report.to_json()["num_faces"], 4);
    }
}
