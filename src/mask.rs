//! Bit-mask arithmetic for mask-gated record sections
//!
//! Several reply sections carry one element per set bit of a mask field,
//! in ascending bit order. These helpers turn masks into counts, walk set
//! bits, and locate a given bit's element within such a run.

/// Number of set bits in `mask`
#[inline]
pub const fn popcount(mask: u32) -> usize {
    mask.count_ones() as usize
}

/// Sum of a run of 8-bit counts
///
/// Used where a record stores per-item counts followed by a list whose
/// total length is their sum, such as per-type level counts ahead of the
/// flattened level-name list.
#[inline]
pub fn sum_of(counts: &[u8]) -> usize {
    counts.iter().map(|&c| c as usize).sum()
}

/// Iterator over the set bit positions of `mask`, ascending
#[inline]
pub fn set_bits(mask: u32) -> impl Iterator<Item = u32> {
    (0..32).filter(move |&i| (mask >> i) & 1 != 0)
}

/// Position of `bit`'s element within a mask-gated run
///
/// Returns `None` when `bit` is not set in `mask`. `bit` must be a single
/// bit.
#[inline]
pub const fn rank_of(mask: u32, bit: u32) -> Option<usize> {
    debug_assert!(bit.is_power_of_two());
    if mask & bit == 0 {
        return None;
    }
    Some(popcount(mask & (bit - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popcount() {
        assert_eq!(popcount(0), 0);
        assert_eq!(popcount(0b101), 2);
        assert_eq!(popcount(u32::MAX), 32);
        assert_eq!(popcount(0x8000_0000), 1);
    }

    #[test]
    fn test_sum_of() {
        assert_eq!(sum_of(&[]), 0);
        assert_eq!(sum_of(&[2, 3, 4]), 9);
        assert_eq!(sum_of(&[255, 255]), 510);
    }

    #[test]
    fn test_set_bits_ascending() {
        let bits: std::vec::Vec<u32> = set_bits(0b1010_0101).collect();
        assert_eq!(bits, std::vec![0, 2, 5, 7]);
        assert_eq!(set_bits(0).count(), 0);
    }

    #[test]
    fn test_set_bits_matches_popcount() {
        for mask in [0u32, 1, 0b111, 0xF0F0, 0xFFFF_FFFF] {
            assert_eq!(set_bits(mask).count(), popcount(mask));
        }
    }

    #[test]
    fn test_rank_of() {
        let mask = 0b1010_0101;
        assert_eq!(rank_of(mask, 1 << 0), Some(0));
        assert_eq!(rank_of(mask, 1 << 2), Some(1));
        assert_eq!(rank_of(mask, 1 << 5), Some(2));
        assert_eq!(rank_of(mask, 1 << 7), Some(3));
        assert_eq!(rank_of(mask, 1 << 1), None);
    }
}
