use crate::core::corner_table::CornerTable;
use crate::core::shared::PointIdx;
use super::PredictionSchemeImpl;

/// Predicts a point `p` of a face by `next + prev - opp`, where `opp` is the far point of the
/// neighbor face across the edge `(next, prev)` opposite `p`.
pub(crate) struct ParallelogramPrediction {
    /// `[next, prev, opp]` for the points that have a parallelogram of coded points.
    parallelograms: Vec<Option<[PointIdx; 3]>>,
    max_value: u32,
}

impl ParallelogramPrediction {
    pub(crate) fn new(table: &CornerTable, max_value: u32) -> Self {
        let parallelograms = (0..table.num_vertices())
            .map(|p| Self::find_parallelogram(table, p))
            .collect();
        Self { parallelograms, max_value }
    }

    /// Swings around the point from its left most corner and returns the first parallelogram
    /// whose three points precede the point.
    fn find_parallelogram(table: &CornerTable, p: PointIdx) -> Option<[PointIdx; 3]> {
        let start = table.left_most_corner(p)?;
        let mut c = start;
        loop {
            if let Some(opp) = table.opposite(c) {
                let candidate = [
                    table.vertex(table.next(opp)),
                    table.vertex(table.previous(opp)),
                    table.vertex(opp),
                ];
                if candidate.iter().all(|&v| v < p) {
                    return Some(candidate);
                }
            }
            c = table.swing_right(c)?;
            if c == start {
                return None;
            }
        }
    }
}

impl PredictionSchemeImpl for ParallelogramPrediction {
    fn predict(&self, point: PointIdx, values: &[u32], out: &mut [u32]) {
        let n = out.len();
        match self.parallelograms.get(point).copied().flatten() {
            Some([next, prev, opp]) => {
                for (i, o) in out.iter_mut().enumerate() {
                    let pred = values[next * n + i] as i64 + values[prev * n + i] as i64
                        - values[opp * n + i] as i64;
                    *o = pred.clamp(0, self.max_value as i64) as u32;
                }
            }
            None if point == 0 => out.fill(0),
            None => out.copy_from_slice(&values[(point - 1) * n..point * n]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallelogram() {
        // two faces sharing the edge (1, 2); point 3 completes the parallelogram 0-1-3-2
        let faces = [[0, 1, 2], [2, 1, 3]];
        let table = CornerTable::new(&faces, 4).unwrap();
        let pred = ParallelogramPrediction::new(&table, 15);
        assert_eq!(pred.parallelograms[3], Some([1, 2, 0]));
        assert_eq!(pred.parallelograms[0], None);

        // unit square corners, scaled to 0..=10
        let values = [0, 0, 10, 0, 0, 10, 0, 0];
        let mut out = [0; 2];
        pred.predict(3, &values, &mut out);
        assert_eq!(out, [10, 10]);

        // falls back to the previous point
        pred.predict(2, &values, &mut out);
        assert_eq!(out, [10, 0]);
    }

    #[test]
    fn test_prediction_is_clamped() {
        let faces = [[0, 1, 2], [2, 1, 3]];
        let table = CornerTable::new(&faces, 4).unwrap();
        let pred = ParallelogramPrediction::new(&table, 15);
        let values = [15, 0, 15, 15, 15, 15, 0, 0];
        let mut out = [0; 2];
        pred.predict(3, &values, &mut out);
        // 15 + 15 - 15 = 15 and 15 + 15 - 0 = 30 -> 15
        assert_eq!(out, [15, 15]);
    }
}
