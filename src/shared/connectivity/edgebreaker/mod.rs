pub mod symbol_encoder;

use crate::core::bit_coder::{BitReader, BitWriter, ByteReader, ByteWriter, ReaderErr};

/// A topology split event. The face of the split symbol was an `S` face, and the face of the
/// source symbol is later found to be adjacent to it across its left or right edge. The decoder
/// uses the event to reconnect the two traversal branches, which is what makes handles representable.
/// Symbol indices are in the encoding order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct TopologySplit {
    pub source_symbol_idx: usize,
    pub split_symbol_idx: usize,
    pub source_edge: Orientation,
}

/// The edge of the source face through which it touches the split face.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Orientation {
    Left,
    Right,
}

impl Orientation {
    #[inline]
    pub(crate) fn get_id(self) -> u64 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    #[inline]
    pub(crate) fn from_id(id: u64) -> Self {
        if id == 0 {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// Writes the split events: the symbol indices delta coded as leb128 integers, the edges as one bit each.
/// The events must be sorted by their source symbol.
pub(crate) fn write_topology_splits<W>(splits: &[TopologySplit], writer: &mut W)
    where W: ByteWriter
{
    use crate::utils::bit_coder::leb128_write;
    leb128_write(splits.len() as u64, writer);
    let mut last_source = 0;
    for split in splits {
        debug_assert!(split.source_symbol_idx >= last_source && split.source_symbol_idx > split.split_symbol_idx);
        leb128_write((split.source_symbol_idx - last_source) as u64, writer);
        leb128_write((split.source_symbol_idx - split.split_symbol_idx) as u64, writer);
        last_source = split.source_symbol_idx;
    }
}

pub(crate) fn write_split_edges<W>(splits: &[TopologySplit], writer: &mut BitWriter<W>)
    where W: ByteWriter
{
    for split in splits {
        writer.write_bits((1, split.source_edge.get_id()));
    }
}

/// Reads the symbol indices of the split events. `None` if an index falls outside `0..num_symbols`
/// or the source symbol does not follow the split symbol.
pub(crate) fn read_topology_splits<R>(reader: &mut R, num_symbols: usize) -> Result<Option<Vec<TopologySplit>>, ReaderErr>
    where R: ByteReader
{
    use crate::utils::bit_coder::leb128_read;
    let num_splits = leb128_read(reader)?;
    if num_splits > num_symbols as u64 {
        return Ok(None);
    }
    let mut out = Vec::with_capacity(num_splits as usize);
    let mut last_source: u64 = 0;
    for _ in 0..num_splits {
        let source = last_source.checked_add(leb128_read(reader)?);
        let back = leb128_read(reader)?;
        let Some(source) = source.filter(|&s| s < num_symbols as u64) else {
            return Ok(None);
        };
        if back == 0 || back > source {
            return Ok(None);
        }
        out.push(TopologySplit {
            source_symbol_idx: source as usize,
            split_symbol_idx: (source - back) as usize,
            source_edge: Orientation::Left,
        });
        last_source = source;
    }
    Ok(Some(out))
}

pub(crate) fn read_split_edges<R>(splits: &mut [TopologySplit], reader: &mut BitReader<R>) -> Result<(), ReaderErr>
    where R: ByteReader
{
    for split in splits {
        split.source_edge = Orientation::from_id(reader.read_bits(1)?);
    }
    Ok(())
}
