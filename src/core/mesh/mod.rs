pub mod builder;

use thiserror::Error;

use crate::core::attribute::{self, Attribute, AttributeKind};
use crate::core::corner_table;
use crate::core::shared::PointIdx;

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Attribute error: {0}")]
    AttributeError(#[from] attribute::Err),
    #[error("Invalid connectivity: {0}")]
    ConnectivityError(#[from] corner_table::Err),
    #[error("The mesh has more than one {0:?} attribute")]
    DuplicateAttribute(AttributeKind),
    #[error("The mesh has {0} attributes, but at most 255 are supported")]
    TooManyAttributes(usize),
}

/// A triangle mesh, or a point cloud if it has no faces.
/// Points are implicit: point `i` is the `i`th value of every attribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub(crate) faces: Vec<[PointIdx; 3]>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) num_points: usize,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_faces(&self) -> &[[PointIdx; 3]] {
        &self.faces
    }

    pub fn get_attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn get_attribute(&self, kind: AttributeKind) -> Option<&Attribute> {
        self.attributes.iter().find(|att| att.kind() == kind)
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn is_point_cloud(&self) -> bool {
        self.faces.is_empty()
    }
}
