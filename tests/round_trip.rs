mod common;

use common::*;
use draco_lite::prelude::*;
use draco_lite::encode::PredictionMethod;

fn round_trip(mesh: &Mesh, cfg: &encode::Config) -> Mesh {
    let mut data = Vec::new();
    encode(mesh, &mut data, cfg).unwrap();
    decode(&data, &decode::Config::default()).unwrap()
}

fn position_tolerance(mesh: &Mesh, bits: u8) -> f32 {
    tolerance(mesh.get_attribute(AttributeKind::Position).unwrap(), bits)
}

#[test]
fn tetrahedron() {
    let mesh = common::tetrahedron();
    let stream = encode_mesh(&mesh).unwrap();
    assert!(!stream.is_empty());
    assert!(stream.len() < 200, "the tetrahedron takes {} bytes", stream.len());

    let decoded = decode_stream(stream.as_bytes()).unwrap();
    assert_eq!(decoded.num_points(), 4);
    assert_eq!(decoded.num_faces(), 4);
    let positions = decoded.get_attribute(AttributeKind::Position).unwrap();
    assert_eq!(positions.quantization_bits(), Some(10));
    assert_same_mesh(&mesh, &decoded, 1.0 / 1023.0);
}

#[test]
fn constant_attribute_is_exact() {
    let mut builder = MeshBuilder::new();
    builder
        .add_vectors(AttributeKind::Position, &[[0.5, -2.0, 7.25]; 4])
        .add_vectors(AttributeKind::Color, &[[1.0, 0.5, 0.0, 1.0]; 4])
        .set_faces(TETRAHEDRON_FACES.to_vec());
    let mesh = builder.build().unwrap();

    let decoded = decode_stream(encode_mesh(&mesh).unwrap().as_bytes()).unwrap();
    assert_eq!(decoded.num_faces(), 4);
    for att in mesh.get_attributes() {
        assert_eq!(decoded.get_attribute(att.kind()).unwrap().values(), att.values());
    }
}

#[test]
fn cube() {
    let mesh = common::cube();
    let decoded = decode_stream(encode_mesh(&mesh).unwrap().as_bytes()).unwrap();
    assert_same_mesh(&mesh, &decoded, position_tolerance(&mesh, 10));
}

#[test]
fn grid_with_boundary() {
    let mesh = grid(5, 7);
    let decoded = decode_stream(encode_mesh(&mesh).unwrap().as_bytes()).unwrap();
    assert_same_mesh(&mesh, &decoded, position_tolerance(&mesh, 10));
}

#[test]
fn every_prediction_method() {
    let mesh = grid(4, 4);
    for prediction in [PredictionMethod::None, PredictionMethod::Delta, PredictionMethod::Parallelogram] {
        let cfg = encode::Config { prediction, ..encode::Config::default() };
        let decoded = round_trip(&mesh, &cfg);
        assert_same_mesh(&mesh, &decoded, position_tolerance(&mesh, 10));
    }
}

#[test]
fn torus() {
    let mesh = common::torus(8, 6);
    let decoded = decode_stream(encode_mesh(&mesh).unwrap().as_bytes()).unwrap();
    assert_same_mesh(&mesh, &decoded, position_tolerance(&mesh, 10));
}

#[test]
fn multiple_components() {
    let mut points = TETRAHEDRON_POINTS.to_vec();
    points.extend(TETRAHEDRON_POINTS.iter().map(|p| [p[0] + 3.0, p[1], p[2] - 1.0]));
    points.extend(common::cube().get_attribute(AttributeKind::Position).unwrap().iter().map(|p| [p[0] - 4.0, p[1], p[2]]));
    let mut faces = TETRAHEDRON_FACES.to_vec();
    faces.extend(TETRAHEDRON_FACES.iter().map(|f| f.map(|i| i + 4)));
    faces.extend(common::cube().get_faces().iter().map(|f| f.map(|i| i + 8)));

    let mut builder = MeshBuilder::new();
    builder
        .add_attribute(Attribute::new(AttributeKind::Position, 3, points.concat()))
        .set_faces(faces);
    let mesh = builder.build().unwrap();
    let decoded = decode_stream(encode_mesh(&mesh).unwrap().as_bytes()).unwrap();
    assert_same_mesh(&mesh, &decoded, position_tolerance(&mesh, 10));
}

#[test]
fn point_cloud_keeps_its_order() {
    let points = (0..50)
        .map(|i| {
            let t = i as f32 * 0.37;
            [t.sin() * 10.0, t.cos() * 10.0, t]
        })
        .collect::<Vec<_>>();
    let intensities = (0..50).map(|i| [(i % 7) as f32]).collect::<Vec<_>>();
    let mut builder = MeshBuilder::new();
    builder
        .add_vectors(AttributeKind::Position, &points)
        .add_vectors(AttributeKind::Generic(42), &intensities);
    let mesh = builder.build().unwrap();
    assert!(mesh.is_point_cloud());

    let decoded = decode_stream(encode_mesh(&mesh).unwrap().as_bytes()).unwrap();
    assert!(decoded.is_point_cloud());
    assert_eq!(decoded.num_points(), 50);
    for (input, output) in mesh.get_attributes().iter().zip(decoded.get_attributes()) {
        assert_eq!(input.kind(), output.kind());
        let tol = tolerance(input, output.quantization_bits().unwrap());
        for (a, b) in input.values().iter().zip(output.values()) {
            assert!((a - b).abs() <= tol);
        }
    }
}

#[test]
fn isolated_points_are_kept() {
    let mut builder = MeshBuilder::new();
    builder
        .add_vectors(
            AttributeKind::Position,
            &[[5.0, 5.0, 5.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [-3.0, 2.0, 1.0]],
        )
        .set_faces(vec![[1, 2, 3], [1, 3, 4]]);
    let mesh = builder.build().unwrap();

    let decoded = decode_stream(encode_mesh(&mesh).unwrap().as_bytes()).unwrap();
    let matching = assert_same_mesh(&mesh, &decoded, position_tolerance(&mesh, 10));
    // Isolated points follow the face vertices, in their input order.
    assert_eq!(matching[4..], [0, 5]);
}

#[test]
fn preserved_point_order() {
    let mesh = common::torus(6, 5);
    let cfg = encode::Config { preserve_point_order: true, ..encode::Config::default() };
    let decoded = round_trip(&mesh, &cfg);
    let matching = assert_same_mesh(&mesh, &decoded, position_tolerance(&mesh, 10));
    assert_eq!(matching, (0..mesh.num_points()).collect::<Vec<_>>());
}

#[test]
fn custom_quantization() {
    let mesh = grid(3, 3);
    let mut cfg = encode::Config::default();
    cfg.quantization.position_bits = 20;
    cfg.quantization.tex_coord_bits = 4;
    let decoded = round_trip(&mesh, &cfg);
    assert_eq!(decoded.get_attribute(AttributeKind::Position).unwrap().quantization_bits(), Some(20));
    assert_eq!(decoded.get_attribute(AttributeKind::TexCoord).unwrap().quantization_bits(), Some(4));
    assert_same_mesh(&mesh, &decoded, position_tolerance(&mesh, 20));
}

#[test]
fn encoding_is_deterministic() {
    let mesh = common::torus(7, 4);
    assert_eq!(encode_mesh(&mesh).unwrap(), encode_mesh(&mesh).unwrap());
}

#[test]
fn range_wider_than_f32() {
    let points = [[-3.0e38, 0.0, 0.0], [3.0e38, 1.0, 0.0], [0.0, 0.0, 1.0]];
    let mut builder = MeshBuilder::new();
    builder
        .add_vectors(AttributeKind::Position, &points)
        .set_faces(vec![[0, 1, 2]]);
    let mesh = builder.build().unwrap();

    let cfg = encode::Config { preserve_point_order: true, ..encode::Config::default() };
    let decoded = round_trip(&mesh, &cfg);
    assert_eq!(decoded.get_faces().len(), 1);
    let positions = decoded.get_attribute(AttributeKind::Position).unwrap();
    // half a step of the shared 6e38 wide range at 10 bits
    let tol = 6.0e38 / 1023.0 * 0.5 * 1.001;
    for (input, output) in points.iter().zip(positions.iter()) {
        for (a, b) in input.iter().zip(output) {
            assert!(b.is_finite());
            assert!((*a as f64 - *b as f64).abs() <= tol, "{a} decoded as {b}");
        }
    }
}
