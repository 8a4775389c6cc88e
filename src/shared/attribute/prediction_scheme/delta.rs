use crate::core::shared::PointIdx;
use super::PredictionSchemeImpl;

pub(crate) struct DeltaPrediction;

impl PredictionSchemeImpl for DeltaPrediction {
    fn predict(&self, point: PointIdx, values: &[u32], out: &mut [u32]) {
        let n = out.len();
        if point == 0 {
            out.fill(0);
        } else {
            out.copy_from_slice(&values[(point - 1) * n..point * n]);
        }
    }
}
