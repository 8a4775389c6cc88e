/// Index of a point of a mesh, i.e. the position of the point in the attribute arrays.
pub type PointIdx = usize;
/// Index of a vertex of a corner table. For the input mesh, vertices and points coincide.
pub type VertexIdx = usize;
/// Index of a corner. Corner `3*f + k` is the `k`th corner of the face `f`.
pub type CornerIdx = usize;
pub type FaceIdx = usize;

/// Configurations of the encoder and the decoder implement this trait.
pub trait ConfigType {
    fn default() -> Self;
}

/// Returns the number of bits needed to represent `val`, i.e. `0` for `0`, `1` for `1`, `2` for `2..=3`, and so on.
#[inline]
pub(crate) fn bit_width(val: u64) -> u8 {
    (u64::BITS - val.leading_zeros()) as u8
}
