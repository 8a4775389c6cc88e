use crate::core::attribute::{Attribute, AttributeKind};
use crate::core::corner_table;
use crate::core::shared::PointIdx;
use super::{Err, Mesh};

/// Assembles a [Mesh] from faces and attributes, checking that they agree with each other.
///
/// The number of points is taken from the attributes. A mesh without attributes gets
/// its number of points from [MeshBuilder::set_num_points], or otherwise from the faces.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    attributes: Vec<Attribute>,
    faces: Vec<[PointIdx; 3]>,
    num_points: Option<usize>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_attribute(&mut self, attribute: Attribute) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    /// Shorthand for adding an attribute from fixed size vectors.
    pub fn add_vectors<const N: usize>(&mut self, kind: AttributeKind, data: &[[f32; N]]) -> &mut Self {
        self.add_attribute(Attribute::from_vectors(kind, data))
    }

    pub fn set_faces(&mut self, faces: Vec<[PointIdx; 3]>) -> &mut Self {
        self.faces = faces;
        self
    }

    pub fn set_num_points(&mut self, num_points: usize) -> &mut Self {
        self.num_points = Some(num_points);
        self
    }

    /// Validates and builds the mesh. Face indices are checked for range and degeneracy here;
    /// manifoldness is checked by the encoder when it builds the corner table.
    pub fn build(self) -> Result<Mesh, Err> {
        let Self { attributes, faces, num_points } = self;

        if attributes.len() > u8::MAX as usize {
            return Err(Err::TooManyAttributes(attributes.len()));
        }
        for (i, att) in attributes.iter().enumerate() {
            if attributes[..i].iter().any(|other| other.kind() == att.kind()) {
                return Err(Err::DuplicateAttribute(att.kind()));
            }
        }

        let num_points = match (attributes.first(), num_points) {
            (Some(att), _) => att.len(),
            (None, Some(n)) => n,
            (None, None) => match faces.iter().flatten().max() {
                None => 0,
                // an index of `usize::MAX` leaves no room for a point count that covers it
                Some(&max) => max.checked_add(1).ok_or_else(|| {
                    let face = faces.iter().position(|f| f.contains(&max)).unwrap_or(0);
                    corner_table::Err::InvalidIndex { face, index: max, num_points: max }
                })?,
            },
        };
        for att in &attributes {
            att.validate(num_points)?;
        }
        corner_table::validate_faces(&faces, num_points)?;

        Ok(Mesh { faces, attributes, num_points })
    }
}
