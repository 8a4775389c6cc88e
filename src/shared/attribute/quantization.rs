//! Uniform quantization of attribute values.
//!
//! A component with range `[min, max]` is mapped to the integers `0..=2^bits - 1` by
//! `q = round((v - min) / (max - min) * (2^bits - 1))`, and back by
//! `v' = min + q / (2^bits - 1) * (max - min)`. The range width is computed in `f64`, so
//! any two finite bounds make a valid range. The reconstruction is lossy: `|v' - v|` is at most
//! half a step `(max - min) / (2^bits - 1)`, up to the rounding of the result to `f32`.
//! A component whose values are all equal has `min == max`, takes zero bits, and is
//! reconstructed exactly.

use thiserror::Error;

use crate::core::bit_coder::{ByteReader, ByteWriter, ReaderErr};

pub const MIN_QUANTIZATION_BITS: u8 = 1;
pub const MAX_QUANTIZATION_BITS: u8 = 30;

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Invalid quantization bits: {0}")]
    InvalidBits(u8),
    #[error("Invalid range for component {component}: min {min}, max {max}")]
    InvalidRange { component: usize, min: f32, max: f32 },
    #[error("Reader error: {0}")]
    ReaderError(#[from] ReaderErr),
}

/// How the ranges of the components of an attribute are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RangeMode {
    /// Every component gets its own range.
    #[default]
    PerComponent,
    /// Every non-constant component gets the range width of the widest component,
    /// so that a quantization step has the same size along every axis.
    Shared,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuantizationParams {
    bits: u8,
    min: Vec<f32>,
    max: Vec<f32>,
}

impl QuantizationParams {
    pub fn new(bits: u8, min: Vec<f32>, max: Vec<f32>) -> Result<Self, Err> {
        if !(MIN_QUANTIZATION_BITS..=MAX_QUANTIZATION_BITS).contains(&bits) {
            return Err(Err::InvalidBits(bits));
        }
        for (component, (&lo, &hi)) in min.iter().zip(&max).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || hi < lo {
                return Err(Err::InvalidRange { component, min: lo, max: hi });
            }
        }
        debug_assert_eq!(min.len(), max.len());
        Ok(Self { bits, min, max })
    }

    /// Computes the range of every component of the values, which must be finite.
    pub fn compute(values: &[f32], num_components: usize, bits: u8, mode: RangeMode) -> Result<Self, Err> {
        let mut min = vec![f32::INFINITY; num_components];
        let mut max = vec![f32::NEG_INFINITY; num_components];
        for value in values.chunks_exact(num_components) {
            for i in 0..num_components {
                min[i] = min[i].min(value[i]);
                max[i] = max[i].max(value[i]);
            }
        }
        if values.is_empty() {
            min.fill(0.0);
            max.fill(0.0);
        }

        if mode == RangeMode::Shared {
            let widest = min.iter()
                .zip(&max)
                .map(|(&lo, &hi)| hi as f64 - lo as f64)
                .fold(0.0_f64, f64::max);
            for (lo, hi) in min.iter().zip(max.iter_mut()) {
                if *hi > *lo {
                    *hi = round_up(*lo as f64 + widest);
                }
            }
        }
        Self::new(bits, min, max)
    }

    #[inline]
    pub fn bits(&self) -> u8 {
        self.bits
    }

    #[inline]
    pub fn num_components(&self) -> usize {
        self.min.len()
    }

    #[inline]
    pub fn min(&self) -> &[f32] {
        &self.min
    }

    #[inline]
    pub fn max(&self) -> &[f32] {
        &self.max
    }

    /// Width of the range of the component.
    #[inline]
    fn delta(&self, component: usize) -> f64 {
        self.max[component] as f64 - self.min[component] as f64
    }

    #[inline]
    pub fn is_constant(&self, component: usize) -> bool {
        self.min[component] == self.max[component]
    }

    /// Number of bits the component takes: zero for constant components.
    #[inline]
    pub fn component_bits(&self, component: usize) -> u8 {
        if self.is_constant(component) {
            0
        } else {
            self.bits
        }
    }

    /// The largest quantized value, `2^bits - 1`.
    #[inline]
    pub fn max_quantized_value(&self) -> u32 {
        (1_u32 << self.bits) - 1
    }

    pub fn quantize_component(&self, component: usize, value: f32) -> u32 {
        let delta = self.delta(component);
        if delta == 0.0 {
            return 0;
        }
        let max = self.max_quantized_value() as f64;
        let t = (value as f64 - self.min[component] as f64) / delta * max;
        t.round().clamp(0.0, max) as u32
    }

    pub fn dequantize_component(&self, component: usize, quantized: u32) -> f32 {
        let delta = self.delta(component);
        if delta == 0.0 {
            return self.min[component];
        }
        let q = quantized.min(self.max_quantized_value()) as f64;
        let v = self.min[component] as f64 + q / self.max_quantized_value() as f64 * delta;
        (v as f32).clamp(self.min[component], self.max[component])
    }

    /// Quantizes a flat array of values, `num_components` per point.
    pub fn quantize(&self, values: &[f32]) -> Vec<u32> {
        let n = self.num_components();
        values.iter()
            .enumerate()
            .map(|(i, &v)| self.quantize_component(i % n, v))
            .collect()
    }

    pub fn dequantize(&self, quantized: &[u32]) -> Vec<f32> {
        let n = self.num_components();
        quantized.iter()
            .enumerate()
            .map(|(i, &q)| self.dequantize_component(i % n, q))
            .collect()
    }

    /// Writes the bit depth and then the range of every component. The number of
    /// components is written by the caller.
    pub(crate) fn write_to<W: ByteWriter>(&self, writer: &mut W) {
        writer.write_u8(self.bits);
        for (&min, &max) in self.min.iter().zip(&self.max) {
            writer.write_f32(min);
            writer.write_f32(max);
        }
    }

    pub(crate) fn read_from<R: ByteReader>(reader: &mut R, num_components: usize) -> Result<Self, Err> {
        let bits = reader.read_u8()?;
        let mut min = Vec::with_capacity(num_components);
        let mut max = Vec::with_capacity(num_components);
        for _ in 0..num_components {
            min.push(reader.read_f32()?);
            max.push(reader.read_f32()?);
        }
        Self::new(bits, min, max)
    }
}

/// The smallest `f32` not below `value`, saturating at `f32::MAX`.
fn round_up(value: f64) -> f32 {
    let out = value as f32;
    if out.is_infinite() || out == f32::MAX {
        f32::MAX
    } else if (out as f64) >= value {
        out
    } else if out == 0.0 {
        f32::from_bits(1)
    } else if out > 0.0 {
        f32::from_bits(out.to_bits() + 1)
    } else {
        f32::from_bits(out.to_bits() - 1)
    }
}
