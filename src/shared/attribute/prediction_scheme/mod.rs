pub mod delta;
pub mod parallelogram;

use crate::core::corner_table::CornerTable;
use crate::core::shared::PointIdx;

/// The predictor of the quantized attribute values. Values are predicted point by point in the
/// decoded point order, and only from the values of the points before.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "evaluation", derive(serde::Serialize))]
pub enum PredictionMethod {
    /// Values are stored as they are.
    None,
    /// A value is predicted by the value of the previous point.
    Delta,
    /// A value is predicted by completing a parallelogram with a neighboring face whose
    /// three points are already coded. Falls back to [PredictionMethod::Delta] where no such
    /// face exists, and everywhere for point clouds.
    #[default]
    Parallelogram,
}

impl PredictionMethod {
    #[inline]
    pub(crate) fn get_id(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Delta => 1,
            Self::Parallelogram => 2,
        }
    }

    #[inline]
    pub(crate) fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::None),
            1 => Some(Self::Delta),
            2 => Some(Self::Parallelogram),
            _ => None,
        }
    }
}

#[enum_dispatch::enum_dispatch]
pub(crate) trait PredictionSchemeImpl {
    /// Writes the prediction of `point` into `out`. `values` holds the values of the points
    /// before `point`, `out.len()` components per point.
    fn predict(&self, point: PointIdx, values: &[u32], out: &mut [u32]);
}

#[enum_dispatch::enum_dispatch(PredictionSchemeImpl)]
pub(crate) enum PredictionScheme {
    NoPrediction(NoPrediction),
    Delta(delta::DeltaPrediction),
    Parallelogram(parallelogram::ParallelogramPrediction),
}

impl PredictionScheme {
    /// `table` is the connectivity in the decoded point order, `None` for point clouds.
    pub(crate) fn new(method: PredictionMethod, table: Option<&CornerTable>, max_value: u32) -> Self {
        match (method, table) {
            (PredictionMethod::None, _) => Self::NoPrediction(NoPrediction),
            (PredictionMethod::Parallelogram, Some(table)) => Self::Parallelogram(
                parallelogram::ParallelogramPrediction::new(table, max_value)
            ),
            (PredictionMethod::Delta, _) | (PredictionMethod::Parallelogram, None) => Self::Delta(delta::DeltaPrediction),
        }
    }
}

pub(crate) struct NoPrediction;

impl PredictionSchemeImpl for NoPrediction {
    fn predict(&self, _point: PointIdx, _values: &[u32], out: &mut [u32]) {
        out.fill(0);
    }
}
