use std::collections::HashMap;

use thiserror::Error;

use crate::core::shared::{CornerIdx, FaceIdx, PointIdx, VertexIdx};

const INVALID: usize = usize::MAX;

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("Face {face} is degenerate: it repeats a point index in {indices:?}")]
    DegenerateFace { face: FaceIdx, indices: [PointIdx; 3] },
    #[error("Face {face} duplicates face {first}")]
    DuplicateFace { face: FaceIdx, first: FaceIdx },
    #[error("Face {face} is oriented inconsistently with its neighbor face {neighbor}")]
    InconsistentOrientation { face: FaceIdx, neighbor: FaceIdx },
    #[error("Face {face} references point {index}, but the mesh has only {num_points} points")]
    InvalidIndex { face: FaceIdx, index: PointIdx, num_points: usize },
    #[error("Non-manifold geometry: {0}")]
    NonManifoldGeometry(NonManifold),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NonManifold {
    #[error("edge ({0}, {1}) is shared by more than two faces")]
    Edge(VertexIdx, VertexIdx),
    #[error("the faces around vertex {0} do not form a single fan")]
    Vertex(VertexIdx),
}

/// Checks the cheap per-face invariants: every index is in range and no face repeats an index.
pub(crate) fn validate_faces(faces: &[[PointIdx; 3]], num_points: usize) -> Result<(), Err> {
    for (face, indices) in faces.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i >= num_points) {
            return Err(Err::InvalidIndex { face, index, num_points });
        }
        if indices[0] == indices[1] || indices[1] == indices[2] || indices[2] == indices[0] {
            return Err(Err::DegenerateFace { face, indices: *indices });
        }
    }
    Ok(())
}

/// The adjacency structure of a triangle mesh.
/// Corner `3*f + k` is the `k`th corner of the face `f`, and the opposite corner of a corner `c`
/// is the corner of the neighboring face that faces the edge opposite `c`.
/// Vertices are the points referenced by faces; a vertex not referenced by any face is isolated.
#[derive(Debug, Clone)]
pub struct CornerTable {
    corner_to_vertex: Vec<VertexIdx>,

    /// `INVALID` for corners on a boundary edge.
    opposite_corners: Vec<CornerIdx>,

    /// `INVALID` for isolated vertices.
    left_most_corners: Vec<CornerIdx>,
}

impl CornerTable {
    /// Builds the corner table of the faces, rejecting anything the edgebreaker coder cannot represent:
    /// out of range indices, degenerate and duplicate faces, edges shared by more than two faces,
    /// neighbors with opposite orientations, and vertices pinching two or more fans together.
    pub fn new(faces: &[[PointIdx; 3]], num_points: usize) -> Result<Self, Err> {
        validate_faces(faces, num_points)?;

        let mut seen_faces = HashMap::with_capacity(faces.len());
        for (face, f) in faces.iter().enumerate() {
            let mut key = *f;
            key.sort_unstable();
            if let Some(&first) = seen_faces.get(&key) {
                return Err(Err::DuplicateFace { face, first });
            }
            seen_faces.insert(key, face);
        }

        let mut out = Self {
            corner_to_vertex: faces.iter().flatten().copied().collect(),
            opposite_corners: vec![INVALID; faces.len() * 3],
            left_most_corners: vec![INVALID; num_points],
        };
        out.compute_opposite_corners()?;
        out.compute_left_most_corners()?;
        Ok(out)
    }

    /// Pairs up the corners facing the same edge.
    fn compute_opposite_corners(&mut self) -> Result<(), Err> {
        let mut num_faces_on_edge: HashMap<(VertexIdx, VertexIdx), usize> = HashMap::new();
        for c in 0..self.num_corners() {
            let (source, sink) = self.edge_opposite(c);
            let count = num_faces_on_edge.entry((source.min(sink), source.max(sink))).or_insert(0);
            *count += 1;
            if *count > 2 {
                return Err(Err::NonManifoldGeometry(NonManifold::Edge(source.min(sink), source.max(sink))));
            }
        }

        // half edge (source, sink) -> the corner facing it
        let mut half_edges: HashMap<(VertexIdx, VertexIdx), CornerIdx> = HashMap::with_capacity(self.num_corners());
        for c in 0..self.num_corners() {
            let (source, sink) = self.edge_opposite(c);
            if let Some(&other) = half_edges.get(&(source, sink)) {
                return Err(Err::InconsistentOrientation {
                    face: self.face(c),
                    neighbor: self.face(other),
                });
            }
            half_edges.insert((source, sink), c);
        }
        for c in 0..self.num_corners() {
            let (source, sink) = self.edge_opposite(c);
            if let Some(&opp) = half_edges.get(&(sink, source)) {
                self.opposite_corners[c] = opp;
            }
        }
        Ok(())
    }

    /// Finds the left most corner of every vertex, and fails if a vertex is shared by
    /// two fans of faces that are not connected around it.
    fn compute_left_most_corners(&mut self) -> Result<(), Err> {
        let mut visited_corners = vec![false; self.num_corners()];
        for c in 0..self.num_corners() {
            if visited_corners[c] {
                continue;
            }
            let v = self.vertex(c);
            if self.left_most_corners[v] != INVALID {
                return Err(Err::NonManifoldGeometry(NonManifold::Vertex(v)));
            }

            // Swing all the way to the left.
            let mut left_most = c;
            let mut act_c = Some(c);
            while let Some(curr) = act_c {
                visited_corners[curr] = true;
                left_most = curr;
                act_c = self.swing_left(curr);
                if act_c == Some(c) {
                    // Reached back to the initial corner.
                    left_most = c;
                    break;
                }
            }
            if act_c.is_none() {
                // Open boundary; mark the rest of the fan by swinging right.
                let mut act_c = self.swing_right(c);
                while let Some(curr) = act_c {
                    visited_corners[curr] = true;
                    act_c = self.swing_right(curr);
                }
            }
            self.left_most_corners[v] = left_most;
        }
        Ok(())
    }

    /// Creates an empty table for `num_faces` faces; the decoder fills it in.
    pub(crate) fn with_num_faces(num_faces: usize) -> Self {
        Self {
            corner_to_vertex: vec![INVALID; num_faces * 3],
            opposite_corners: vec![INVALID; num_faces * 3],
            left_most_corners: Vec::new(),
        }
    }

    #[inline]
    fn edge_opposite(&self, c: CornerIdx) -> (VertexIdx, VertexIdx) {
        (self.vertex(self.next(c)), self.vertex(self.previous(c)))
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.corner_to_vertex.len() / 3
    }

    #[inline]
    pub fn num_corners(&self) -> usize {
        self.corner_to_vertex.len()
    }

    /// Number of vertex slots, including isolated vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.left_most_corners.len()
    }

    #[inline]
    pub fn face(&self, corner: CornerIdx) -> FaceIdx {
        corner / 3
    }

    #[inline]
    pub fn first_corner(face: FaceIdx) -> CornerIdx {
        face * 3
    }

    #[inline]
    pub fn vertex(&self, corner: CornerIdx) -> VertexIdx {
        self.corner_to_vertex[corner]
    }

    #[inline]
    pub fn face_vertices(&self, face: FaceIdx) -> [VertexIdx; 3] {
        let c = Self::first_corner(face);
        [self.vertex(c), self.vertex(c + 1), self.vertex(c + 2)]
    }

    #[inline]
    pub fn next(&self, corner: CornerIdx) -> CornerIdx {
        if corner % 3 == 2 {
            corner - 2
        } else {
            corner + 1
        }
    }

    #[inline]
    pub fn previous(&self, corner: CornerIdx) -> CornerIdx {
        if corner % 3 == 0 {
            corner + 2
        } else {
            corner - 1
        }
    }

    #[inline]
    pub fn opposite(&self, corner: CornerIdx) -> Option<CornerIdx> {
        match self.opposite_corners[corner] {
            INVALID => None,
            c => Some(c),
        }
    }

    #[inline]
    pub fn is_boundary_edge(&self, corner: CornerIdx) -> bool {
        self.opposite(corner).is_none()
    }

    /// The left most corner of the vertex, i.e. the corner from which swinging right visits
    /// every corner of the vertex. `None` for isolated vertices.
    #[inline]
    pub fn left_most_corner(&self, vertex: VertexIdx) -> Option<CornerIdx> {
        match self.left_most_corners[vertex] {
            INVALID => None,
            c => Some(c),
        }
    }

    #[inline]
    pub fn swing_left(&self, corner: CornerIdx) -> Option<CornerIdx> {
        self.opposite(self.next(corner)).map(|c| self.next(c))
    }

    #[inline]
    pub fn swing_right(&self, corner: CornerIdx) -> Option<CornerIdx> {
        self.opposite(self.previous(corner)).map(|c| self.previous(c))
    }

    /// The corner opposite the edge to the left of the corner, seen from the corner into the face.
    #[inline]
    pub fn left_corner(&self, corner: CornerIdx) -> Option<CornerIdx> {
        self.opposite(self.previous(corner))
    }

    #[inline]
    pub fn right_corner(&self, corner: CornerIdx) -> Option<CornerIdx> {
        self.opposite(self.next(corner))
    }

    #[inline]
    pub(crate) fn set_opposite_corners(&mut self, c1: CornerIdx, c2: CornerIdx) {
        self.opposite_corners[c1] = c2;
        self.opposite_corners[c2] = c1;
    }

    #[inline]
    pub(crate) fn map_corner_to_vertex(&mut self, corner: CornerIdx, vertex: VertexIdx) {
        self.corner_to_vertex[corner] = vertex;
    }

    #[inline]
    pub(crate) fn add_new_vertex(&mut self) -> VertexIdx {
        self.left_most_corners.push(INVALID);
        self.left_most_corners.len() - 1
    }

    #[inline]
    pub(crate) fn set_left_most_corner(&mut self, vertex: VertexIdx, corner: CornerIdx) {
        self.left_most_corners[vertex] = corner;
    }

    /// Detaches the vertex slot from every corner; used when two vertices are merged.
    #[inline]
    pub(crate) fn make_vertex_isolated(&mut self, vertex: VertexIdx) {
        self.left_most_corners[vertex] = INVALID;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Vec<[usize; 3]> {
        vec![[0, 1, 2], [0, 3, 1], [1, 3, 2], [2, 3, 0]]
    }

    #[test]
    fn test_closed_mesh() {
        let faces = tetrahedron();
        let table = CornerTable::new(&faces, 4).unwrap();
        assert_eq!(table.num_faces(), 4);
        assert_eq!(table.num_vertices(), 4);
        for c in 0..table.num_corners() {
            let opp = table.opposite(c).unwrap();
            assert_eq!(table.opposite(opp), Some(c));
            assert_ne!(table.face(c), table.face(opp));
            // the edge opposite a corner is shared with reversed direction
            assert_eq!(table.vertex(table.next(c)), table.vertex(table.previous(opp)));
            assert_eq!(table.vertex(table.previous(c)), table.vertex(table.next(opp)));
        }
        for v in 0..4 {
            let c = table.left_most_corner(v).unwrap();
            assert!(table.swing_left(c).is_some());
        }
    }

    #[test]
    fn test_boundary() {
        // a square split into two triangles
        let faces = vec![[0, 1, 2], [0, 2, 3]];
        let table = CornerTable::new(&faces, 5).unwrap();
        assert_eq!(table.opposite(1).map(|c| table.face(c)), Some(1));
        assert!(table.is_boundary_edge(0));
        for v in 0..4 {
            let c = table.left_most_corner(v).unwrap();
            assert_eq!(table.swing_left(c), None);
        }
        // vertex 4 is isolated
        assert_eq!(table.left_most_corner(4), None);
    }

    #[test]
    fn test_swings_visit_the_fan() {
        let faces = tetrahedron();
        let table = CornerTable::new(&faces, 4).unwrap();
        let start = table.left_most_corner(0).unwrap();
        let mut c = start;
        let mut visited = Vec::new();
        loop {
            assert_eq!(table.vertex(c), 0);
            visited.push(table.face(c));
            c = table.swing_right(c).unwrap();
            if c == start {
                break;
            }
        }
        visited.sort();
        assert_eq!(visited, vec![0, 1, 3]);
        assert_eq!(table.swing_left(table.swing_right(start).unwrap()), Some(start));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            CornerTable::new(&[[0, 1, 4]], 4).unwrap_err(),
            Err::InvalidIndex { face: 0, index: 4, num_points: 4 }
        );
        assert_eq!(
            CornerTable::new(&[[0, 1, 2], [0, 1, 1]], 3).unwrap_err(),
            Err::DegenerateFace { face: 1, indices: [0, 1, 1] }
        );
        assert_eq!(
            CornerTable::new(&[[0, 1, 2], [1, 2, 0]], 3).unwrap_err(),
            Err::DuplicateFace { face: 1, first: 0 }
        );
        assert_eq!(
            CornerTable::new(&[[0, 1, 2], [0, 1, 3]], 4).unwrap_err(),
            Err::InconsistentOrientation { face: 1, neighbor: 0 }
        );
        assert_eq!(
            CornerTable::new(&[[0, 1, 2], [1, 0, 3], [0, 1, 4]], 5).unwrap_err(),
            Err::NonManifoldGeometry(NonManifold::Edge(0, 1))
        );
        // two triangles touching at a single vertex
        assert_eq!(
            CornerTable::new(&[[0, 1, 2], [0, 3, 4]], 5).unwrap_err(),
            Err::NonManifoldGeometry(NonManifold::Vertex(0))
        );
    }
}
