mod common;

use common::assert_same_mesh;
use draco_lite::prelude::*;

fn load_obj(path: &str) -> Mesh {
    let (models, _) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).unwrap();
    let mesh = &models[0].mesh;

    let faces = mesh.indices.chunks(3)
        .map(|x| [x[0] as usize, x[1] as usize, x[2] as usize])
        .collect::<Vec<_>>();
    let points = mesh.positions.chunks(3)
        .map(|x| [x[0] as f32, x[1] as f32, x[2] as f32])
        .collect::<Vec<_>>();
    let normals = mesh.normals.chunks(3)
        .map(|x| [x[0] as f32, x[1] as f32, x[2] as f32])
        .collect::<Vec<_>>();

    let mut builder = MeshBuilder::new();
    builder.add_vectors(AttributeKind::Position, &points);
    if !normals.is_empty() {
        builder.add_vectors(AttributeKind::Normal, &normals);
    }
    builder.set_faces(faces);
    builder.build().unwrap()
}

#[test]
fn octahedron() {
    let mesh = load_obj("tests/data/octahedron.obj");
    assert_eq!(mesh.num_points(), 6);
    assert_eq!(mesh.num_faces(), 8);

    let decoded = decode_stream(encode_mesh(&mesh).unwrap().as_bytes()).unwrap();
    let matching = assert_same_mesh(&mesh, &decoded, 1.0 / 1023.0 + 1e-6);

    // every normal still points along its position
    let positions = decoded.get_attribute(AttributeKind::Position).unwrap();
    let normals = decoded.get_attribute(AttributeKind::Normal).unwrap();
    for (p, q) in matching.iter().enumerate() {
        let dot = positions.get(p).unwrap().iter()
            .zip(normals.get(p).unwrap())
            .map(|(a, b)| a * b)
            .sum::<f32>();
        assert!(dot > 0.99, "normal of input point {q} is off");
    }
}

#[test]
fn triangulated_quads() {
    let mesh = load_obj("tests/data/cube_quads.obj");
    assert_eq!(mesh.num_points(), 8);
    assert_eq!(mesh.num_faces(), 12);

    let cfg = encode::Config { preserve_point_order: true, ..encode::Config::default() };
    let mut data = Vec::new();
    encode(&mesh, &mut data, &cfg).unwrap();
    let decoded = decode(&data, &decode::Config::default()).unwrap();
    let matching = assert_same_mesh(&mesh, &decoded, 1.0 / 2046.0 + 1e-6);
    assert_eq!(matching, (0..8).collect::<Vec<_>>());
}
