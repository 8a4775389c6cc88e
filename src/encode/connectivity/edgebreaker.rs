use std::collections::HashMap;

use crate::core::bit_coder::{BitWriter, ByteWriter};
use crate::core::corner_table::CornerTable;
use crate::core::shared::{CornerIdx, FaceIdx, VertexIdx};
use crate::decode::connectivity::DecodedConnectivity;
use crate::shared::connectivity::edgebreaker::symbol_encoder::{CrLight, Symbol, SymbolEncoder};
use crate::shared::connectivity::edgebreaker::{
    write_split_edges, write_topology_splits, Orientation, TopologySplit,
};
use crate::utils::bit_coder::leb128_write;

/// The edgebreaker traversal over a corner table.
///
/// Faces are visited component by component. A component starts either from an interior face,
/// whose three vertices are marked visited and which is then treated as the gate of the traversal,
/// or from a boundary edge, in which case the boundary loop containing it is marked visited.
/// Every further face is classified by the visitation state of its tip vertex and of its left
/// and right neighbors:
/// `C` (tip vertex not visited yet), `L` (only the left neighbor visited), `R` (only the right
/// neighbor visited), `E` (both visited) and `S` (neither visited; the traversal branches).
pub(crate) struct Edgebreaker<'table> {
    table: &'table CornerTable,

    visited_faces: Vec<bool>,
    visited_vertices: Vec<bool>,

    /// The boundary loop each vertex lies on, if any.
    vertex_hole_id: Vec<Option<usize>>,
    visited_holes: Vec<bool>,

    corner_traversal_stack: Vec<CornerIdx>,

    symbols: Vec<Symbol>,

    /// The tip corner of every face with a symbol, in the encoding order.
    processed_corners: Vec<CornerIdx>,

    /// The gate corner of every component starting from an interior face.
    init_corners: Vec<CornerIdx>,

    /// Whether each component starts from an interior face.
    start_face_configurations: Vec<bool>,

    face_to_split_symbol: HashMap<FaceIdx, usize>,
    topology_splits: Vec<TopologySplit>,
    num_split_symbols: usize,
}

/// The result of the traversal.
pub(crate) struct EdgebreakerOutput {
    pub symbols: Vec<Symbol>,
    pub topology_splits: Vec<TopologySplit>,
    pub start_face_configurations: Vec<bool>,
    pub num_split_symbols: usize,

    /// Number of vertices touched by the faces.
    pub num_vertices: usize,

    /// For every face of the decoded connectivity, the corner of the input that the decoder
    /// maps to its first corner. The other two corners follow by [CornerTable::next].
    pub decoded_face_corners: Vec<CornerIdx>,
}

impl<'table> Edgebreaker<'table> {
    pub(crate) fn new(table: &'table CornerTable) -> Self {
        Self {
            table,
            visited_faces: vec![false; table.num_faces()],
            visited_vertices: vec![false; table.num_vertices()],
            vertex_hole_id: vec![None; table.num_vertices()],
            visited_holes: Vec::new(),
            corner_traversal_stack: Vec::new(),
            symbols: Vec::with_capacity(table.num_faces()),
            processed_corners: Vec::with_capacity(table.num_faces()),
            init_corners: Vec::new(),
            start_face_configurations: Vec::new(),
            face_to_split_symbol: HashMap::new(),
            topology_splits: Vec::new(),
            num_split_symbols: 0,
        }
    }

    pub(crate) fn traverse(mut self) -> EdgebreakerOutput {
        self.find_holes();

        for face in 0..self.table.num_faces() {
            if self.visited_faces[face] {
                continue;
            }
            let (is_interior, start_corner) = self.find_init_face_configuration(face);
            self.start_face_configurations.push(is_interior);
            if is_interior {
                for c in [start_corner, self.table.next(start_corner), self.table.previous(start_corner)] {
                    self.visited_vertices[self.table.vertex(c)] = true;
                }
                // The start face gets no symbol. The traversal starts from the face across the
                // edge opposite its next corner, which makes the start face look like a `C` face
                // to the decoder.
                self.visited_faces[face] = true;
                let gate = self.table.next(start_corner);
                self.init_corners.push(gate);
                if let Some(opp) = self.table.opposite(gate) {
                    if !self.visited_faces[self.table.face(opp)] {
                        self.encode_from_corner(opp);
                    }
                }
            } else {
                // Start on the boundary: the hole opposite the start corner comes first.
                self.encode_hole(self.table.next(start_corner), true);
                self.encode_from_corner(start_corner);
            }
        }

        let num_vertices = self.visited_vertices.iter().filter(|&&v| v).count();
        let mut decoded_face_corners = self.processed_corners;
        decoded_face_corners.reverse();
        decoded_face_corners.extend(self.init_corners);

        log::trace!(
            "edgebreaker: {} symbols, {} components, {} split symbols, {} topology splits",
            self.symbols.len(),
            self.start_face_configurations.len(),
            self.num_split_symbols,
            self.topology_splits.len()
        );

        EdgebreakerOutput {
            symbols: self.symbols,
            topology_splits: self.topology_splits,
            start_face_configurations: self.start_face_configurations,
            num_split_symbols: self.num_split_symbols,
            num_vertices,
            decoded_face_corners,
        }
    }

    /// Assigns every boundary vertex the id of the boundary loop it lies on.
    fn find_holes(&mut self) {
        for c in 0..self.table.num_corners() {
            if !self.table.is_boundary_edge(c) {
                continue;
            }
            let mut boundary_vertex = self.table.vertex(self.table.next(c));
            if self.vertex_hole_id[boundary_vertex].is_some() {
                continue;
            }
            let hole_id = self.visited_holes.len();
            self.visited_holes.push(false);

            let mut corner = c;
            while self.vertex_hole_id[boundary_vertex].is_none() {
                self.vertex_hole_id[boundary_vertex] = Some(hole_id);
                corner = self.next_boundary_corner(self.table.next(corner));
                boundary_vertex = self.table.vertex(self.table.next(corner));
            }
        }
    }

    /// Swings from the corner until its opposite edge is a boundary edge.
    fn next_boundary_corner(&self, mut corner: CornerIdx) -> CornerIdx {
        while let Some(opp) = self.table.opposite(corner) {
            corner = self.table.next(opp);
        }
        corner
    }

    /// Returns whether the component of the face starts from an interior face, and the start corner.
    /// For a boundary start, the start corner is the corner opposite the first boundary edge found.
    fn find_init_face_configuration(&self, face: FaceIdx) -> (bool, CornerIdx) {
        let mut corner = CornerTable::first_corner(face);
        for _ in 0..3 {
            if self.table.is_boundary_edge(corner) {
                return (false, corner);
            }
            if self.vertex_hole_id[self.table.vertex(corner)].is_some() {
                // Boundary vertex found; swing right to the boundary edge attached to it.
                let mut right = Some(corner);
                while let Some(r) = right {
                    corner = r;
                    right = self.table.swing_right(r);
                }
                return (false, self.table.previous(corner));
            }
            corner = self.table.next(corner);
        }
        (true, corner)
    }

    /// Marks the vertices of the boundary loop through the vertex of `start_corner` as visited.
    fn encode_hole(&mut self, start_corner: CornerIdx, encode_first_vertex: bool) {
        let mut corner = self.next_boundary_corner(self.table.previous(start_corner));
        let start_vertex = self.table.vertex(start_corner);
        if encode_first_vertex {
            self.visited_vertices[start_vertex] = true;
        }
        if let Some(hole_id) = self.vertex_hole_id[start_vertex] {
            self.visited_holes[hole_id] = true;
        }

        let mut act_vertex = self.table.vertex(self.table.previous(corner));
        while act_vertex != start_vertex {
            self.visited_vertices[act_vertex] = true;
            corner = self.next_boundary_corner(self.table.next(corner));
            act_vertex = self.table.vertex(self.table.previous(corner));
        }
    }

    #[inline]
    fn is_face_visited(&self, corner: Option<CornerIdx>) -> bool {
        // A missing face counts as visited.
        corner.is_none_or(|c| self.visited_faces[self.table.face(c)])
    }

    fn encode_symbol(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    fn encode_from_corner(&mut self, corner: CornerIdx) {
        self.corner_traversal_stack.clear();
        self.corner_traversal_stack.push(corner);
        while let Some(&top) = self.corner_traversal_stack.last() {
            if self.visited_faces[self.table.face(top)] {
                self.corner_traversal_stack.pop();
                continue;
            }
            let mut corner = top;
            loop {
                let face = self.table.face(corner);
                let symbol_idx = self.symbols.len();
                self.visited_faces[face] = true;
                self.processed_corners.push(corner);

                let vertex = self.table.vertex(corner);
                let on_boundary = self.vertex_hole_id[vertex].is_some();
                if !self.visited_vertices[vertex] {
                    self.visited_vertices[vertex] = true;
                    if !on_boundary {
                        self.encode_symbol(Symbol::C);
                        // `C` faces always have an unvisited right face.
                        match self.table.right_corner(corner) {
                            Some(right) => {
                                corner = right;
                                continue;
                            }
                            None => unreachable!("interior vertex with a boundary edge"),
                        }
                    }
                }

                let right = self.table.right_corner(corner);
                let left = self.table.left_corner(corner);
                if self.is_face_visited(right) {
                    if let Some(right) = right {
                        self.check_topology_split(symbol_idx, Orientation::Right, self.table.face(right));
                    }
                    if self.is_face_visited(left) {
                        if let Some(left) = left {
                            self.check_topology_split(symbol_idx, Orientation::Left, self.table.face(left));
                        }
                        self.encode_symbol(Symbol::E);
                        self.corner_traversal_stack.pop();
                        break;
                    }
                    self.encode_symbol(Symbol::R);
                    // the left face is not visited, hence it exists
                    corner = left.unwrap_or(corner);
                } else if self.is_face_visited(left) {
                    if let Some(left) = left {
                        self.check_topology_split(symbol_idx, Orientation::Left, self.table.face(left));
                    }
                    self.encode_symbol(Symbol::L);
                    corner = right.unwrap_or(corner);
                } else {
                    self.encode_symbol(Symbol::S);
                    self.num_split_symbols += 1;
                    if let Some(hole_id) = self.vertex_hole_id[vertex] {
                        if !self.visited_holes[hole_id] {
                            self.encode_hole(corner, false);
                        }
                    }
                    self.face_to_split_symbol.insert(face, symbol_idx);
                    // The right branch is traversed first, the left one when the right one ends.
                    if let (Some(left), Some(right)) = (left, right) {
                        if let Some(top) = self.corner_traversal_stack.last_mut() {
                            *top = left;
                        }
                        self.corner_traversal_stack.push(right);
                    }
                    break;
                }
            }
        }
    }

    /// Records a topology split event if the neighbor face was an `S` face.
    fn check_topology_split(&mut self, source_symbol_idx: usize, source_edge: Orientation, neighbor_face: FaceIdx) {
        if let Some(&split_symbol_idx) = self.face_to_split_symbol.get(&neighbor_face) {
            self.topology_splits.push(TopologySplit {
                source_symbol_idx,
                split_symbol_idx,
                source_edge,
            });
        }
    }
}

impl EdgebreakerOutput {
    /// Writes the connectivity section: the counts and the split events, followed by one
    /// bitstream holding the split edges, the symbols in reverse order and the start face
    /// configurations.
    pub(crate) fn write_to<W: ByteWriter>(&self, writer: &mut W) {
        leb128_write(self.num_vertices as u64, writer);
        leb128_write(self.symbols.len() as u64, writer);
        leb128_write(self.num_split_symbols as u64, writer);
        write_topology_splits(&self.topology_splits, writer);

        let mut bit_writer: BitWriter<_> = BitWriter::spown_from(writer);
        write_split_edges(&self.topology_splits, &mut bit_writer);
        for &symbol in self.symbols.iter().rev() {
            bit_writer.write_bits(CrLight::encode_symbol(symbol));
        }
        for &is_interior in &self.start_face_configurations {
            bit_writer.write_bits((1, is_interior as u64));
        }
    }

    /// Maps the vertices of the decoded connectivity to the vertices of the input.
    /// Returns `None` if the decoded connectivity does not match the traversal.
    pub(crate) fn decoded_to_input_vertices(&self, input: &CornerTable, decoded: &DecodedConnectivity) -> Option<Vec<VertexIdx>> {
        if decoded.faces.len() != self.decoded_face_corners.len() || decoded.num_vertices != self.num_vertices {
            return None;
        }
        let mut out = vec![None; decoded.num_vertices];
        for (face, &first) in decoded.faces.iter().zip(&self.decoded_face_corners) {
            let mut input_corner = first;
            for &v in face {
                let input_v = input.vertex(input_corner);
                match out[v] {
                    None => out[v] = Some(input_v),
                    Some(w) if w != input_v => return None,
                    _ => {}
                }
                input_corner = input.next(input_corner);
            }
        }
        out.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Symbol::*;

    fn traverse(faces: &[[usize; 3]]) -> EdgebreakerOutput {
        let num_points = faces.iter().flatten().max().map_or(0, |m| m + 1);
        let table = CornerTable::new(faces, num_points).unwrap();
        Edgebreaker::new(&table).traverse()
    }

    #[test]
    fn single_triangle() {
        let out = traverse(&[[0, 1, 2]]);
        assert_eq!(out.symbols, vec![E]);
        assert_eq!(out.start_face_configurations, vec![false]);
        assert_eq!(out.num_vertices, 3);
        assert!(out.topology_splits.is_empty());
    }

    #[test]
    fn tetrahedron() {
        let out = traverse(&[[0, 1, 2], [0, 3, 1], [1, 3, 2], [2, 3, 0]]);
        // the start face has no symbol, and the remaining three faces close around one new vertex
        assert_eq!(out.symbols, vec![C, R, E]);
        assert_eq!(out.start_face_configurations, vec![true]);
        assert_eq!(out.decoded_face_corners.len(), 4);
        assert_eq!(out.num_vertices, 4);
    }

    #[test]
    fn components() {
        let out = traverse(&[[0, 1, 2], [3, 4, 5], [6, 7, 8]]);
        assert_eq!(out.symbols, vec![E, E, E]);
        assert_eq!(out.start_face_configurations, vec![false; 3]);
        // the decoder sees the last encoded face first
        assert_eq!(out.decoded_face_corners[0] / 3, 2);
    }

    #[test]
    fn every_face_is_processed_once() {
        // a 3x3 grid of quads, i.e. a disk with interior vertices
        let mut faces = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                let v = y * 4 + x;
                faces.push([v, v + 1, v + 5]);
                faces.push([v, v + 5, v + 4]);
            }
        }
        let out = traverse(&faces);
        assert_eq!(out.symbols.len(), faces.len());
        let mut seen = out.decoded_face_corners.iter().map(|c| c / 3).collect::<Vec<_>>();
        seen.sort();
        assert_eq!(seen, (0..faces.len()).collect::<Vec<_>>());
        assert_eq!(out.num_vertices, 16);
        assert_eq!(out.symbols.iter().filter(|&&s| s == S).count(), out.num_split_symbols);
    }

    #[test]
    fn write_layout() {
        let out = traverse(&[[0, 1, 2]]);
        let mut buffer = Vec::new();
        out.write_to(&mut buffer);
        // 3 vertices, 1 symbol, no split symbols, no split events, then `E` = 111 and the boundary start bit 0
        assert_eq!(buffer, vec![3, 1, 0, 0, 0b11100000]);
    }
}
