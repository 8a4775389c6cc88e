use std::collections::HashMap;

use crate::core::bit_coder::{BitReader, SliceReader};
use crate::core::corner_table::CornerTable;
use crate::core::shared::{CornerIdx, VertexIdx};
use crate::shared::connectivity::edgebreaker::symbol_encoder::{CrLight, Symbol, SymbolEncoder};
use crate::shared::connectivity::edgebreaker::{
    read_split_edges, read_topology_splits, Orientation, TopologySplit,
};
use crate::utils::bit_coder::leb128_read;

use super::{DecodedConnectivity, Err};

/// Decodes the edgebreaker symbols in the reverse order of the encoder.
/// Every symbol adds one face, glued to the active edges on the stack, and vertices are
/// created when a face closes a part of the traversal that the encoder opened.
pub(crate) struct SpiraleReversi {
    table: CornerTable,

    num_faces: usize,
    num_symbols: usize,
    num_vertices: usize,
    max_num_vertices: usize,

    active_corner_stack: Vec<CornerIdx>,

    /// Topology splits left to process, sorted by the source symbol.
    topology_splits: Vec<TopologySplit>,

    /// Decoder symbol id of a split symbol -> the active corner the split restores.
    topology_split_active_corners: HashMap<usize, CornerIdx>,

    num_decoded_faces: usize,
}

impl SpiraleReversi {
    /// Reads the counts and split events of the section, leaving the reader at the bitstream.
    pub(crate) fn read_from(reader: &mut SliceReader<'_>, num_faces: usize) -> Result<Self, Err> {
        let num_vertices = leb128_read(reader)?;
        let num_symbols = leb128_read(reader)?;
        let num_split_symbols = leb128_read(reader)?;

        // every face takes at least one bit, and creates at most three vertices
        if num_symbols > num_faces as u64 || num_faces > reader.remaining().saturating_mul(8) {
            return Err(Err::InvalidSymbolCount {
                num_symbols: num_symbols.min(usize::MAX as u64) as usize,
                num_faces,
            });
        }
        let num_symbols = num_symbols as usize;
        if num_vertices > 3 * num_faces as u64 || num_split_symbols > num_symbols as u64 {
            return Err(Err::TooManyVertices { limit: 3 * num_faces });
        }
        let num_vertices = num_vertices as usize;

        let topology_splits = read_topology_splits(reader, num_symbols)?
            .ok_or(Err::InvalidTopologySplit)?;

        Ok(Self {
            table: CornerTable::with_num_faces(num_faces),
            num_faces,
            num_symbols,
            num_vertices,
            max_num_vertices: num_vertices + num_split_symbols as usize,
            active_corner_stack: Vec::new(),
            topology_splits,
            topology_split_active_corners: HashMap::new(),
            num_decoded_faces: 0,
        })
    }

    /// Decodes the bitstream that follows the split events.
    pub(crate) fn decode(mut self, reader: &mut SliceReader<'_>) -> Result<DecodedConnectivity, Err> {
        let mut bit_reader: BitReader<_> = BitReader::spown_from(reader);
        read_split_edges(&mut self.topology_splits, &mut bit_reader)?;

        for symbol_id in 0..self.num_symbols {
            let symbol = CrLight::decode_symbol(&mut bit_reader)?;
            let corner = CornerTable::first_corner(self.num_decoded_faces);
            self.num_decoded_faces += 1;
            match symbol {
                Symbol::C => self.decode_c(symbol_id, corner)?,
                Symbol::R | Symbol::L => {
                    self.decode_r_or_l(symbol_id, corner, symbol == Symbol::R)?;
                    self.process_topology_splits(symbol_id)?;
                }
                Symbol::S => self.decode_s(symbol_id, corner)?,
                Symbol::E => {
                    self.decode_e(corner)?;
                    self.process_topology_splits(symbol_id)?;
                }
            }
        }

        // What remains on the stack is one active edge per component, the last decoded first.
        while let Some(corner) = self.active_corner_stack.pop() {
            let is_interior = bit_reader.read_bits(1)? == 1;
            if is_interior {
                self.close_interior_start_face(corner)?;
            }
        }

        if self.num_decoded_faces != self.num_faces {
            return Err(Err::FaceCountMismatch {
                expected: self.num_faces,
                actual: self.num_decoded_faces,
            });
        }
        self.compact()
    }

    fn new_vertex(&mut self, corner: CornerIdx) -> Result<VertexIdx, Err> {
        let v = self.table.add_new_vertex();
        if self.table.num_vertices() > self.max_num_vertices {
            return Err(Err::TooManyVertices { limit: self.max_num_vertices });
        }
        self.table.map_corner_to_vertex(corner, v);
        self.table.set_left_most_corner(v, corner);
        Ok(v)
    }

    fn top(&self, symbol: usize) -> Result<CornerIdx, Err> {
        self.active_corner_stack.last().copied().ok_or(Err::StackUnderflow { symbol })
    }

    fn set_top(&mut self, corner: CornerIdx) {
        if let Some(top) = self.active_corner_stack.last_mut() {
            *top = corner;
        }
    }

    /// The left most corner of the vertex, followed by one [CornerTable::next].
    fn next_of_left_most(&self, v: VertexIdx, symbol: usize) -> Result<CornerIdx, Err> {
        self.table.left_most_corner(v)
            .map(|c| self.table.next(c))
            .ok_or(Err::InvalidVertexMerge { symbol })
    }

    fn is_open(&self, corners: &[CornerIdx]) -> bool {
        corners.iter().all(|&c| self.table.opposite(c).is_none())
    }

    /// A new face closes the gap between the active edge and the edge to its left.
    fn decode_c(&mut self, symbol: usize, corner: CornerIdx) -> Result<(), Err> {
        let corner_a = self.top(symbol)?;
        let vertex_x = self.table.vertex(self.table.next(corner_a));
        let corner_b = self.next_of_left_most(vertex_x, symbol)?;
        if corner_a == corner_b || !self.is_open(&[corner_a, corner_b]) {
            return Err(Err::EdgeAlreadyClosed { symbol });
        }
        let vertex_a_prev = self.table.vertex(self.table.previous(corner_a));
        let vertex_b_next = self.table.vertex(self.table.next(corner_b));
        if vertex_x == vertex_a_prev || vertex_x == vertex_b_next {
            return Err(Err::InvalidVertexMerge { symbol });
        }
        self.table.set_opposite_corners(corner_a, corner + 1);
        self.table.set_opposite_corners(corner_b, corner + 2);
        self.table.map_corner_to_vertex(corner, vertex_x);
        self.table.map_corner_to_vertex(corner + 1, vertex_b_next);
        self.table.map_corner_to_vertex(corner + 2, vertex_a_prev);
        self.table.set_left_most_corner(vertex_a_prev, corner + 2);
        self.set_top(corner);
        Ok(())
    }

    /// A new face with one new vertex, attached to the active edge by its left (`R`) or right (`L`) edge.
    fn decode_r_or_l(&mut self, symbol: usize, corner: CornerIdx, is_r: bool) -> Result<(), Err> {
        let corner_a = self.top(symbol)?;
        if !self.is_open(&[corner_a]) {
            return Err(Err::EdgeAlreadyClosed { symbol });
        }
        let (opp_corner, corner_l, corner_r) = if is_r {
            (corner + 2, corner + 1, corner)
        } else {
            (corner + 1, corner, corner + 2)
        };
        self.table.set_opposite_corners(opp_corner, corner_a);
        self.new_vertex(opp_corner)?;

        let vertex_r = self.table.vertex(self.table.previous(corner_a));
        self.table.map_corner_to_vertex(corner_r, vertex_r);
        self.table.set_left_most_corner(vertex_r, corner_r);
        let vertex_l = self.table.vertex(self.table.next(corner_a));
        self.table.map_corner_to_vertex(corner_l, vertex_l);
        self.set_top(corner);
        Ok(())
    }

    /// A new face joins the two topmost active edges, merging two vertices into one.
    fn decode_s(&mut self, symbol: usize, corner: CornerIdx) -> Result<(), Err> {
        let corner_b = self.active_corner_stack.pop().ok_or(Err::StackUnderflow { symbol })?;
        if let Some(split_corner) = self.topology_split_active_corners.remove(&symbol) {
            self.active_corner_stack.push(split_corner);
        }
        let corner_a = self.top(symbol)?;
        if corner_a == corner_b || !self.is_open(&[corner_a, corner_b]) {
            return Err(Err::EdgeAlreadyClosed { symbol });
        }
        self.table.set_opposite_corners(corner_a, corner + 2);
        self.table.set_opposite_corners(corner_b, corner + 1);

        let vertex_p = self.table.vertex(self.table.previous(corner_a));
        self.table.map_corner_to_vertex(corner, vertex_p);
        self.table.map_corner_to_vertex(corner + 1, self.table.vertex(self.table.next(corner_a)));
        let vertex_b_prev = self.table.vertex(self.table.previous(corner_b));
        self.table.map_corner_to_vertex(corner + 2, vertex_b_prev);
        self.table.set_left_most_corner(vertex_b_prev, corner + 2);

        // Every corner of the vertex n, swinging left from the corner after b, becomes p.
        let mut corner_n = self.table.next(corner_b);
        let vertex_n = self.table.vertex(corner_n);
        if vertex_n == vertex_p {
            return Err(Err::InvalidVertexMerge { symbol });
        }
        let left_most = self.table.left_most_corner(vertex_n).ok_or(Err::InvalidVertexMerge { symbol })?;
        self.table.set_left_most_corner(vertex_p, left_most);
        let first_corner = corner_n;
        let mut num_swings = 0;
        loop {
            self.table.map_corner_to_vertex(corner_n, vertex_p);
            match self.table.swing_left(corner_n) {
                Some(c) if c == first_corner || num_swings > self.table.num_corners() => {
                    return Err(Err::InvalidVertexMerge { symbol });
                }
                Some(c) => corner_n = c,
                None => break,
            }
            num_swings += 1;
        }
        self.table.make_vertex_isolated(vertex_n);
        self.set_top(corner);
        Ok(())
    }

    /// A new face with three new vertices, starting a new active edge.
    fn decode_e(&mut self, corner: CornerIdx) -> Result<(), Err> {
        for c in corner..corner + 3 {
            self.new_vertex(c)?;
        }
        self.active_corner_stack.push(corner);
        Ok(())
    }

    /// Records the active corners that the split symbols of the current symbol restore.
    fn process_topology_splits(&mut self, symbol: usize) -> Result<(), Err> {
        let encoder_symbol_id = self.num_symbols - symbol - 1;
        while let Some(split) = self.topology_splits.last().copied() {
            if split.source_symbol_idx > encoder_symbol_id {
                return Err(Err::InvalidTopologySplit);
            }
            if split.source_symbol_idx != encoder_symbol_id {
                break;
            }
            self.topology_splits.pop();
            let top = self.top(symbol)?;
            let new_active_corner = match split.source_edge {
                Orientation::Right => self.table.next(top),
                Orientation::Left => self.table.previous(top),
            };
            let decoder_split_symbol_id = self.num_symbols - split.split_symbol_idx - 1;
            self.topology_split_active_corners.insert(decoder_split_symbol_id, new_active_corner);
        }
        Ok(())
    }

    /// Adds the start face of a component that the encoder started from an interior face.
    /// The face closes the three active edges around it.
    fn close_interior_start_face(&mut self, corner: CornerIdx) -> Result<(), Err> {
        let symbol = self.num_symbols;
        if self.num_decoded_faces >= self.num_faces {
            return Err(Err::FaceCountMismatch {
                expected: self.num_faces,
                actual: self.num_decoded_faces + 1,
            });
        }
        let vertex_n = self.table.vertex(self.table.next(corner));
        let corner_b = self.next_of_left_most(vertex_n, symbol)?;
        let vertex_x = self.table.vertex(self.table.next(corner_b));
        let corner_c = self.next_of_left_most(vertex_x, symbol)?;
        if corner == corner_b || corner == corner_c || corner_b == corner_c
            || !self.is_open(&[corner, corner_b, corner_c])
        {
            return Err(Err::EdgeAlreadyClosed { symbol });
        }
        let vertex_p = self.table.vertex(self.table.next(corner_c));

        let new_corner = CornerTable::first_corner(self.num_decoded_faces);
        self.num_decoded_faces += 1;
        self.table.set_opposite_corners(new_corner, corner);
        self.table.set_opposite_corners(new_corner + 1, corner_b);
        self.table.set_opposite_corners(new_corner + 2, corner_c);
        self.table.map_corner_to_vertex(new_corner, vertex_x);
        self.table.map_corner_to_vertex(new_corner + 1, vertex_p);
        self.table.map_corner_to_vertex(new_corner + 2, vertex_n);
        Ok(())
    }

    /// Drops the vertex slots emptied by merges and renumbers the others in creation order.
    fn compact(self) -> Result<DecodedConnectivity, Err> {
        let mut new_index = vec![None; self.table.num_vertices()];
        let mut num_vertices = 0;
        for (v, idx) in new_index.iter_mut().enumerate() {
            if self.table.left_most_corner(v).is_some() {
                *idx = Some(num_vertices);
                num_vertices += 1;
            }
        }
        if num_vertices != self.num_vertices {
            return Err(Err::VertexCountMismatch {
                expected: self.num_vertices,
                actual: num_vertices,
            });
        }

        let mut is_referenced = vec![false; num_vertices];
        let mut faces = Vec::with_capacity(self.num_faces);
        for f in 0..self.num_faces {
            let mut face = [0; 3];
            for (k, v) in self.table.face_vertices(f).into_iter().enumerate() {
                let idx = new_index.get(v)
                    .copied()
                    .flatten()
                    .ok_or(Err::InvalidVertexMerge { symbol: self.num_symbols })?;
                is_referenced[idx] = true;
                face[k] = idx;
            }
            faces.push(face);
        }
        if let Some(unused) = is_referenced.iter().position(|&r| !r) {
            return Err(Err::VertexCountMismatch {
                expected: self.num_vertices,
                actual: unused,
            });
        }
        Ok(DecodedConnectivity { faces, num_vertices })
    }
}
