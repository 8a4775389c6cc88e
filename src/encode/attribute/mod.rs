use thiserror::Error;

use crate::core::attribute::{Attribute, AttributeKind};
use crate::core::bit_coder::{BitWriter, ByteWriter};
use crate::core::corner_table::CornerTable;
use crate::core::shared::{bit_width, ConfigType, PointIdx};
use crate::shared::attribute::prediction_scheme::{PredictionMethod, PredictionScheme, PredictionSchemeImpl};
use crate::shared::attribute::quantization::{self, QuantizationParams, RangeMode, MAX_QUANTIZATION_BITS, MIN_QUANTIZATION_BITS};
use crate::shared::header::AttributeDescriptor;
use crate::utils::to_positive_i32;

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Invalid quantization bits {bits} for {kind:?}; it must be in 1..=30")]
    InvalidQuantizationBits { kind: AttributeKind, bits: u8 },
    #[error("Quantization error: {0}")]
    QuantizationError(#[from] quantization::Err),
}

/// Bit depth and range mode per attribute kind.
/// The bit depth of an [Attribute] overrides the one given here.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantizationConfig {
    pub position_bits: u8,
    pub normal_bits: u8,
    pub color_bits: u8,
    pub tex_coord_bits: u8,
    pub generic_bits: u8,

    pub position_range_mode: RangeMode,
    /// Range mode of every kind other than positions.
    pub range_mode: RangeMode,
}

impl ConfigType for QuantizationConfig {
    fn default() -> Self {
        Self {
            position_bits: 10,
            normal_bits: 10,
            color_bits: 8,
            tex_coord_bits: 10,
            generic_bits: 11,
            position_range_mode: RangeMode::Shared,
            range_mode: RangeMode::PerComponent,
        }
    }
}

impl QuantizationConfig {
    pub fn bits_for(&self, kind: AttributeKind) -> u8 {
        match kind {
            AttributeKind::Position => self.position_bits,
            AttributeKind::Normal => self.normal_bits,
            AttributeKind::Color => self.color_bits,
            AttributeKind::TexCoord => self.tex_coord_bits,
            AttributeKind::Generic(_) => self.generic_bits,
        }
    }

    pub fn range_mode_for(&self, kind: AttributeKind) -> RangeMode {
        match kind {
            AttributeKind::Position => self.position_range_mode,
            _ => self.range_mode,
        }
    }
}

/// An attribute section with the manifest entry describing it.
pub(crate) struct EncodedAttribute {
    pub descriptor: AttributeDescriptor,
    pub data: Vec<u8>,
}

/// Quantizes the attribute and writes the prediction residuals of its points in the order
/// given by `point_order`. `table` is the connectivity over the points in that order.
pub(crate) fn encode_attribute(
    att: &Attribute,
    point_order: Option<&[PointIdx]>,
    table: Option<&CornerTable>,
    method: PredictionMethod,
    cfg: &QuantizationConfig,
) -> Result<EncodedAttribute, Err> {
    let kind = att.kind();
    let bits = att.quantization_bits().unwrap_or_else(|| cfg.bits_for(kind));
    if !(MIN_QUANTIZATION_BITS..=MAX_QUANTIZATION_BITS).contains(&bits) {
        return Err(Err::InvalidQuantizationBits { kind, bits });
    }
    let n = att.num_components();
    let params = QuantizationParams::compute(att.values(), n, bits, cfg.range_mode_for(kind))?;

    let quantized = match point_order {
        Some(order) => order.iter()
            .flat_map(|&p| att.get(p).unwrap_or_default())
            .enumerate()
            .map(|(i, &v)| params.quantize_component(i % n, v))
            .collect::<Vec<_>>(),
        None => params.quantize(att.values()),
    };

    let scheme = PredictionScheme::new(method, table, params.max_quantized_value());
    let residuals = compute_residuals(&quantized, n, &scheme);

    let mut data = Vec::new();
    data.write_u8(method.get_id());
    write_residuals(&residuals, &params, &mut data);

    log::debug!(
        "{:?}: {} points, {} bits, {:?} prediction, {} bytes",
        kind,
        att.len(),
        bits,
        method,
        data.len()
    );
    Ok(EncodedAttribute {
        descriptor: AttributeDescriptor { kind, quantization: params },
        data,
    })
}

/// The zigzag mapped differences between the values and their predictions.
fn compute_residuals(quantized: &[u32], num_components: usize, scheme: &PredictionScheme) -> Vec<u32> {
    let mut prediction = vec![0; num_components];
    let mut out = Vec::with_capacity(quantized.len());
    for (point, value) in quantized.chunks_exact(num_components).enumerate() {
        scheme.predict(point, quantized, &mut prediction);
        for (&v, &p) in value.iter().zip(&prediction) {
            // both are below 2^30
            out.push(to_positive_i32(v as i32 - p as i32));
        }
    }
    out
}

/// Writes the bit width of every non-constant component followed by the residuals point by point.
/// Constant components take no bits at all.
fn write_residuals<W: ByteWriter>(residuals: &[u32], params: &QuantizationParams, writer: &mut W) {
    let n = params.num_components();
    let widths = (0..n)
        .map(|c| {
            if params.is_constant(c) {
                return 0;
            }
            let max = residuals.iter().skip(c).step_by(n).copied().max().unwrap_or(0);
            bit_width(max as u64)
        })
        .collect::<Vec<_>>();
    for c in (0..n).filter(|&c| !params.is_constant(c)) {
        writer.write_u8(widths[c]);
    }

    let mut bit_writer: BitWriter<_> = BitWriter::spown_from(writer);
    for value in residuals.chunks_exact(n) {
        for (&r, &width) in value.iter().zip(&widths) {
            bit_writer.write_bits((width, r as u64));
        }
    }
}
