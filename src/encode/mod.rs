pub mod attribute;
pub mod connectivity;
pub mod header;

use thiserror::Error;

pub use attribute::QuantizationConfig;
pub use crate::shared::attribute::prediction_scheme::PredictionMethod;
pub use crate::shared::attribute::quantization::RangeMode;

use crate::core::bit_coder::ByteWriter;
use crate::core::corner_table::{self, CornerTable};
use crate::core::mesh::Mesh;
use crate::core::shared::ConfigType;
use crate::shared::header::{
    Frame, GeometryType, Header, FLAG_POINT_ORDER_PRESERVED, VERSION_MAJOR, VERSION_MINOR,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub quantization: QuantizationConfig,
    pub prediction: PredictionMethod,

    /// Makes the decoder restore the point numbering of the input mesh, at the cost of
    /// storing the map from the decoded numbering. Point clouds always keep their order.
    pub preserve_point_order: bool,
}

impl ConfigType for Config {
    fn default() -> Self {
        Self {
            quantization: QuantizationConfig::default(),
            prediction: PredictionMethod::default(),
            preserve_point_order: false,
        }
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Attribute encoding error: {0}")]
    AttributeError(#[from] attribute::Err),
    #[error("Connectivity encoding error: {0}")]
    ConnectivityError(#[from] connectivity::Err),
    #[error("Invalid mesh: {0}")]
    ValidationError(#[from] corner_table::Err),
}

/// Encodes the mesh and writes the stream to the writer.
pub fn encode<W>(mesh: &Mesh, writer: &mut W, cfg: &Config) -> Result<(), Err>
    where W: ByteWriter
{
    let frame = encode_frame(mesh, cfg, |_| {})?;
    header::frame(&frame, writer);
    Ok(())
}

/// Encodes every section of the mesh without writing anything.
/// `inspect` is called with the encoded connectivity of a mesh before its parts are moved into the frame.
pub(crate) fn encode_frame<F>(mesh: &Mesh, cfg: &Config, mut inspect: F) -> Result<Frame, Err>
    where F: FnMut(&connectivity::EncodedConnectivity)
{
    let num_points = mesh.num_points();
    let mut flags = 0;
    let (connectivity, point_map, table, point_order) = if mesh.is_point_cloud() {
        (None, None, None, None)
    } else {
        let table = CornerTable::new(mesh.get_faces(), num_points)?;
        let encoded = connectivity::encode_connectivity(&table)?;
        inspect(&encoded);
        let point_map = if cfg.preserve_point_order {
            flags |= FLAG_POINT_ORDER_PRESERVED;
            let mut data = Vec::new();
            connectivity::write_point_map(&encoded.point_order, &mut data);
            Some(data)
        } else {
            None
        };
        (Some(encoded.data), point_map, Some(encoded.decoded_table), Some(encoded.point_order))
    };

    let mut descriptors = Vec::with_capacity(mesh.get_attributes().len());
    let mut attributes = Vec::with_capacity(mesh.get_attributes().len());
    for att in mesh.get_attributes() {
        let encoded = attribute::encode_attribute(
            att,
            point_order.as_deref(),
            table.as_ref(),
            cfg.prediction,
            &cfg.quantization,
        )?;
        descriptors.push(encoded.descriptor);
        attributes.push(encoded.data);
    }

    let header = Header {
        version_major: VERSION_MAJOR,
        version_minor: VERSION_MINOR,
        geometry_type: if mesh.is_point_cloud() { GeometryType::PointCloud } else { GeometryType::Mesh },
        flags,
        num_points,
        num_faces: mesh.num_faces(),
        attributes: descriptors,
    };
    log::debug!(
        "encoded {:?}: {} points, {} faces, {} attributes",
        header.geometry_type,
        header.num_points,
        header.num_faces,
        header.attributes.len()
    );
    Ok(Frame { header, connectivity, point_map, attributes })
}
