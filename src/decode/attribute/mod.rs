use thiserror::Error;

use crate::core::attribute::{Attribute, AttributeKind};
use crate::core::bit_coder::{BitReader, ByteReader, ReaderErr};
use crate::core::corner_table::CornerTable;
use crate::core::shared::PointIdx;
use crate::shared::attribute::prediction_scheme::{PredictionMethod, PredictionScheme, PredictionSchemeImpl};
use crate::shared::header::AttributeDescriptor;
use crate::utils::from_positive_i32;

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("{kind:?} attribute: invalid residual bit width {width} for component {component}")]
    InvalidResidualWidth { kind: AttributeKind, component: usize, width: u8 },
    #[error("Attribute section overruns its declared length: {0}")]
    SectionOverrun(#[from] ReaderErr),
    #[error("{kind:?} attribute: unknown prediction method id {id}")]
    UnknownPredictionMethod { kind: AttributeKind, id: u8 },
    #[error("{kind:?} attribute: value of point {point}, component {component} is out of the quantization range")]
    ValueOutOfRange { kind: AttributeKind, point: PointIdx, component: usize },
}

/// Decodes an attribute section into the values of `num_points` points, in the decoded point order.
/// `table` is the decoded connectivity, `None` for point clouds.
pub(crate) fn decode_attribute<R: ByteReader>(
    reader: &mut R,
    descriptor: &AttributeDescriptor,
    num_points: usize,
    table: Option<&CornerTable>,
) -> Result<Attribute, Err> {
    let kind = descriptor.kind;
    let params = &descriptor.quantization;
    let n = params.num_components();

    let id = reader.read_u8()?;
    let method = PredictionMethod::from_id(id).ok_or(Err::UnknownPredictionMethod { kind, id })?;

    let mut widths = vec![0; n];
    for (component, width) in widths.iter_mut().enumerate() {
        if params.is_constant(component) {
            continue;
        }
        *width = reader.read_u8()?;
        if *width > 32 {
            return Err(Err::InvalidResidualWidth { kind, component, width: *width });
        }
    }

    let max_value = params.max_quantized_value();
    let scheme = PredictionScheme::new(method, table, max_value);
    let mut quantized = vec![0_u32; num_points * n];
    let mut prediction = vec![0; n];
    let mut bit_reader: BitReader<_> = BitReader::spown_from(reader);
    for point in 0..num_points {
        scheme.predict(point, &quantized, &mut prediction);
        for component in 0..n {
            let residual = bit_reader.read_bits(widths[component])? as u32;
            let value = prediction[component] as i64 + from_positive_i32(residual) as i64;
            if value < 0 || value > max_value as i64 {
                return Err(Err::ValueOutOfRange { kind, point, component });
            }
            quantized[point * n + component] = value as u32;
        }
    }

    Ok(Attribute::new(kind, n, params.dequantize(&quantized)).with_quantization_bits(params.bits()))
}
