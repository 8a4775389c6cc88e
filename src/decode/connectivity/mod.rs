pub(crate) mod spirale_reversi;

use thiserror::Error;

use crate::core::bit_coder::{BitReader, ByteReader, ReaderErr, SliceReader};
use crate::core::corner_table;
use crate::core::shared::{bit_width, PointIdx, VertexIdx};

/// Errors of a connectivity section that does not describe a valid mesh.
#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("Decoded faces do not form a valid mesh: {0}")]
    AdjacencyError(#[from] corner_table::Err),
    #[error("Symbol {symbol} attaches a face to an edge that is already closed")]
    EdgeAlreadyClosed { symbol: usize },
    #[error("Stream declares {expected} faces, but the connectivity produced {actual}")]
    FaceCountMismatch { expected: usize, actual: usize },
    #[error("Connectivity declares {num_symbols} symbols for {num_faces} faces")]
    InvalidSymbolCount { num_symbols: usize, num_faces: usize },
    #[error("Invalid topology split data")]
    InvalidTopologySplit,
    #[error("Symbol {symbol} merges vertices that cannot be merged")]
    InvalidVertexMerge { symbol: usize },
    #[error("Point map entry {entry} is {value}, but there are only {num_points} points, or it repeats")]
    PointMapError { entry: usize, value: u64, num_points: usize },
    #[error("Section content overruns its declared length: {0}")]
    SectionOverrun(#[from] ReaderErr),
    #[error("Symbol {symbol} needs an active edge, but the traversal stack is empty")]
    StackUnderflow { symbol: usize },
    #[error("Connectivity creates more than {limit} vertices")]
    TooManyVertices { limit: usize },
    #[error("Stream declares {expected} vertices, but the connectivity produced {actual}")]
    VertexCountMismatch { expected: usize, actual: usize },
}

/// Faces in the decoded numbering. Vertices are numbered `0..num_vertices` in the order the
/// decoder creates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecodedConnectivity {
    pub faces: Vec<[VertexIdx; 3]>,
    pub num_vertices: usize,
}

/// Decodes a connectivity section holding `num_faces` faces.
pub(crate) fn decode_connectivity(reader: &mut SliceReader<'_>, num_faces: usize) -> Result<DecodedConnectivity, Err> {
    let out = spirale_reversi::SpiraleReversi::read_from(reader, num_faces)?.decode(reader)?;
    log::trace!("decoded {} faces over {} vertices", out.faces.len(), out.num_vertices);
    Ok(out)
}

/// Reads the map from decoded point index to original point index. Every entry takes the
/// bit width of the largest point index.
pub(crate) fn read_point_map<R: ByteReader>(reader: &mut R, num_points: usize) -> Result<Vec<PointIdx>, Err> {
    let width = bit_width(num_points.saturating_sub(1) as u64);
    let mut seen = vec![false; num_points];
    let mut out = Vec::with_capacity(num_points);
    let mut bit_reader: BitReader<_> = BitReader::spown_from(reader);
    for entry in 0..num_points {
        let value = bit_reader.read_bits(width)?;
        match seen.get_mut(value as usize) {
            Some(s) if !*s => *s = true,
            _ => return Err(Err::PointMapError { entry, value, num_points }),
        }
        out.push(value as PointIdx);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_point_map() {
        // 3 entries of 2 bits: 2, 0, 1
        let data = [0b10_00_01_00];
        let mut reader = SliceReader::new(&data);
        assert_eq!(read_point_map(&mut reader, 3).unwrap(), vec![2, 0, 1]);

        // 3 is out of range
        let data = [0b11_00_01_00];
        let mut reader = SliceReader::new(&data);
        assert_eq!(
            read_point_map(&mut reader, 3),
            Err(Err::PointMapError { entry: 0, value: 3, num_points: 3 })
        );

        // repeated entry
        let data = [0b01_01_00_00];
        let mut reader = SliceReader::new(&data);
        assert!(matches!(read_point_map(&mut reader, 3), Err(Err::PointMapError { entry: 1, .. })));

        let mut reader = SliceReader::new(&[]);
        assert!(matches!(read_point_map(&mut reader, 5), Err(Err::SectionOverrun(_))));
    }
}
