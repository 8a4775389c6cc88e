pub(crate) mod bit_coder;
pub(crate) mod debug;

/// Maps a signed integer to an unsigned one so that values of small magnitude stay small:
/// `0, -1, 1, -2, 2, ...` go to `0, 1, 2, 3, 4, ...`.
pub(crate) fn to_positive_i32(val: i32) -> u32 {
    if val >= 0 {
        (val as u32) << 1
    } else {
        ((-(val + 1) as u32) << 1) + 1
    }
}

/// Inverse of [to_positive_i32].
pub(crate) fn from_positive_i32(val: u32) -> i32 {
    if val & 1 == 0 {
        (val >> 1) as i32
    } else {
        -((val >> 1) as i32) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_positive_i32() {
        assert_eq!(to_positive_i32(0), 0);
        assert_eq!(to_positive_i32(-1), 1);
        assert_eq!(to_positive_i32(1), 2);
        assert_eq!(to_positive_i32(-2), 3);
        assert_eq!(to_positive_i32(i32::MAX), u32::MAX - 1);
        assert_eq!(to_positive_i32(i32::MIN), u32::MAX);
    }

    #[test]
    fn test_from_positive_i32() {
        for val in [0, 1, -1, 2, -2, 1000, -1000, i32::MAX, i32::MIN] {
            assert_eq!(from_positive_i32(to_positive_i32(val)), val);
        }
    }
}
