#![allow(dead_code)]

use std::collections::HashSet;
use std::f32::consts::TAU;

use draco_lite::prelude::*;

pub const TETRAHEDRON_POINTS: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

pub const TETRAHEDRON_FACES: [[PointIdx; 3]; 4] = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];

pub fn tetrahedron() -> Mesh {
    let mut builder = MeshBuilder::new();
    builder
        .add_attribute(Attribute::from_vectors(AttributeKind::Position, &TETRAHEDRON_POINTS).with_quantization_bits(10))
        .set_faces(TETRAHEDRON_FACES.to_vec());
    builder.build().unwrap()
}

/// Unit cube with outward facing triangles. Point `x + 2y + 4z` sits at `(x, y, z)`.
pub fn cube() -> Mesh {
    let points = (0..8)
        .map(|i| [(i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32])
        .collect::<Vec<_>>();
    let faces = vec![
        [0, 2, 3], [0, 3, 1],
        [4, 5, 7], [4, 7, 6],
        [0, 1, 5], [0, 5, 4],
        [2, 6, 7], [2, 7, 3],
        [0, 4, 6], [0, 6, 2],
        [1, 3, 7], [1, 7, 5],
    ];
    let mut builder = MeshBuilder::new();
    builder
        .add_vectors(AttributeKind::Position, &points)
        .set_faces(faces);
    builder.build().unwrap()
}

/// A flat `n` by `m` grid of quads split into triangles. It has a single boundary loop.
pub fn grid(n: usize, m: usize) -> Mesh {
    let idx = |i: usize, j: usize| i * (m + 1) + j;
    let mut points = Vec::new();
    let mut tex_coords = Vec::new();
    for i in 0..=n {
        for j in 0..=m {
            points.push([i as f32, j as f32, ((i * j) % 3) as f32 * 0.25]);
            tex_coords.push([i as f32 / n as f32, j as f32 / m as f32]);
        }
    }
    let mut faces = Vec::new();
    for i in 0..n {
        for j in 0..m {
            faces.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
            faces.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }
    let mut builder = MeshBuilder::new();
    builder
        .add_vectors(AttributeKind::Position, &points)
        .add_vectors(AttributeKind::TexCoord, &tex_coords)
        .set_faces(faces);
    builder.build().unwrap()
}

/// A closed torus (genus 1) sampled on an `n` by `m` grid.
pub fn torus(n: usize, m: usize) -> Mesh {
    let idx = |i: usize, j: usize| (i % n) * m + (j % m);
    let mut points = Vec::new();
    let mut normals = Vec::new();
    for i in 0..n {
        let u = TAU * i as f32 / n as f32;
        for j in 0..m {
            let v = TAU * j as f32 / m as f32;
            let r = 2.0 + v.cos();
            points.push([r * u.cos(), r * u.sin(), v.sin()]);
            normals.push([v.cos() * u.cos(), v.cos() * u.sin(), v.sin()]);
        }
    }
    let mut faces = Vec::new();
    for i in 0..n {
        for j in 0..m {
            faces.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
            faces.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }
    let mut builder = MeshBuilder::new();
    builder
        .add_vectors(AttributeKind::Position, &points)
        .add_vectors(AttributeKind::Normal, &normals)
        .set_faces(faces);
    builder.build().unwrap()
}

/// Largest distance between the input values and the decoded ones that quantization may cause.
pub fn tolerance(att: &Attribute, bits: u8) -> f32 {
    let mut widest = 0.0_f32;
    for c in 0..att.num_components() {
        let (lo, hi) = att.iter()
            .map(|v| v[c])
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
        widest = widest.max(hi - lo);
    }
    widest / ((1_u32 << bits) - 1) as f32 * 0.5 + 1e-5
}

fn distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f32::max)
}

/// Rotates the face so that its smallest index comes first, keeping the orientation.
fn canonical(face: [PointIdx; 3]) -> [PointIdx; 3] {
    let k = (0..3).min_by_key(|&k| face[k]).unwrap_or(0);
    [face[k], face[(k + 1) % 3], face[(k + 2) % 3]]
}

/// Matches every decoded point to the input point with the closest position,
/// and checks that the faces describe the same oriented triangles under that matching.
/// Returns the matching, i.e. the input point of every decoded point.
pub fn assert_same_mesh(input: &Mesh, decoded: &Mesh, tol: f32) -> Vec<PointIdx> {
    assert_eq!(decoded.num_points(), input.num_points());
    assert_eq!(decoded.num_faces(), input.num_faces());
    assert_eq!(decoded.get_attributes().len(), input.get_attributes().len());

    let input_pos = input.get_attribute(AttributeKind::Position).unwrap();
    let decoded_pos = decoded.get_attribute(AttributeKind::Position).unwrap();
    let matching = decoded_pos.iter()
        .map(|p| {
            (0..input.num_points())
                .min_by(|&a, &b| {
                    distance(p, input_pos.get(a).unwrap()).total_cmp(&distance(p, input_pos.get(b).unwrap()))
                })
                .unwrap()
        })
        .collect::<Vec<_>>();
    assert_eq!(matching.iter().collect::<HashSet<_>>().len(), input.num_points(), "points are not matched one to one");

    for (decoded_att, input_att) in decoded.get_attributes().iter().zip(input.get_attributes()) {
        assert_eq!(decoded_att.kind(), input_att.kind());
        let tol = if input_att.kind() == AttributeKind::Position {
            tol
        } else {
            tolerance(input_att, decoded_att.quantization_bits().unwrap())
        };
        for (p, &q) in matching.iter().enumerate() {
            let d = distance(decoded_att.get(p).unwrap(), input_att.get(q).unwrap());
            assert!(d <= tol, "{:?} of point {p} is off by {d}", input_att.kind());
        }
    }

    let expected = input.get_faces().iter().map(|&f| canonical(f)).collect::<HashSet<_>>();
    let actual = decoded.get_faces()
        .iter()
        .map(|f| canonical([matching[f[0]], matching[f[1]], matching[f[2]]]))
        .collect::<HashSet<_>>();
    assert_eq!(actual, expected);
    matching
}
