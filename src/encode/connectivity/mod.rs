pub(crate) mod edgebreaker;

use thiserror::Error;

use crate::core::bit_coder::{BitWriter, ByteWriter, SliceReader};
use crate::core::corner_table::{self, CornerTable};
use crate::core::shared::{bit_width, PointIdx};
use crate::decode::connectivity::{decode_connectivity, DecodedConnectivity};
#[cfg(any(test, feature = "evaluation"))]
use crate::shared::connectivity::edgebreaker::symbol_encoder::Symbol;

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("The decoded connectivity does not form a valid mesh: {0}")]
    DecodedMeshInvalid(#[from] corner_table::Err),
    #[error("The encoded connectivity cannot be decoded: {0}")]
    ReplayFailed(#[from] crate::decode::connectivity::Err),
    #[error("The encoded connectivity decodes to a mesh different from the input")]
    ReplayMismatch,
}

/// The connectivity section together with what the attribute encoder needs to know
/// about the decoder's view of the mesh.
pub(crate) struct EncodedConnectivity {
    pub data: Vec<u8>,

    /// The corner table the decoder reconstructs, over the points in decoded order.
    pub decoded_table: CornerTable,

    /// `point_order[i]` is the input point that the decoder knows as point `i`.
    pub point_order: Vec<PointIdx>,

    #[cfg(any(test, feature = "evaluation"))]
    pub symbols: Vec<Symbol>,
    #[cfg(any(test, feature = "evaluation"))]
    pub num_topology_splits: usize,
}

/// Encodes the connectivity of the table and replays the decoder on the result.
/// Points not referenced by any face follow the face-referenced ones in their input order.
pub(crate) fn encode_connectivity(table: &CornerTable) -> Result<EncodedConnectivity, Err> {
    let output = edgebreaker::Edgebreaker::new(table).traverse();
    let mut data = Vec::new();
    output.write_to(&mut data);

    let decoded = decode_connectivity(&mut SliceReader::new(&data), table.num_faces())?;
    let mut point_order = output.decoded_to_input_vertices(table, &decoded)
        .ok_or(Err::ReplayMismatch)?;
    point_order.extend(
        (0..table.num_vertices()).filter(|&v| table.left_most_corner(v).is_none())
    );
    let DecodedConnectivity { faces, .. } = decoded;
    let decoded_table = CornerTable::new(&faces, table.num_vertices())?;

    log::debug!(
        "connectivity: {} faces, {} vertices, {} symbols, {} topology splits, {} bytes",
        table.num_faces(),
        output.num_vertices,
        output.symbols.len(),
        output.topology_splits.len(),
        data.len()
    );

    Ok(EncodedConnectivity {
        data,
        decoded_table,
        point_order,
        #[cfg(any(test, feature = "evaluation"))]
        num_topology_splits: output.topology_splits.len(),
        #[cfg(any(test, feature = "evaluation"))]
        symbols: output.symbols,
    })
}

/// Writes the map from decoded point index to input point index, each entry in the
/// bit width of the largest point index.
pub(crate) fn write_point_map<W: ByteWriter>(point_order: &[PointIdx], writer: &mut W) {
    let width = bit_width(point_order.len().saturating_sub(1) as u64);
    let mut bit_writer: BitWriter<_> = BitWriter::spown_from(writer);
    for &p in point_order {
        bit_writer.write_bits((width, p as u64));
    }
}
