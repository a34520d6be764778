//! Bit-level helpers used by the register update path.

/// Return the number of consecutive zero bits of `x`, counting from the most significant bit.
///
/// An all-zero word yields the full width (32), meaning the digest ran out of bits before a set
/// bit was found. The zero case is handled before reaching the hardware instruction, since
/// count-leading-zeros intrinsics are not guaranteed to define it.
#[inline]
pub fn leading_zero_count(x: u32) -> u32 {
    if x == 0 {
        return u32::BITS;
    }
    x.leading_zeros()
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0 => 32; "zero word")]
    #[test_case(1 => 31; "lowest bit")]
    #[test_case(0x8000_0000 => 0; "highest bit")]
    #[test_case(0x0000_ffff => 16; "lower half")]
    #[test_case(0x00f0_0000 => 8; "middle nibble")]
    #[test_case(u32::MAX => 0; "all bits")]
    fn test_leading_zero_count(x: u32) -> u32 {
        leading_zero_count(x)
    }

    #[test]
    fn test_leading_zero_count_single_bits() {
        for shift in 0..32 {
            assert_eq!(leading_zero_count(1 << shift), 31 - shift);
        }
    }
}
