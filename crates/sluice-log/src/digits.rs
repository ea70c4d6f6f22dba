//! In-place decimal formatting into a stack scratch array.

/// Enough room for `u64::MAX` (20 digits) or `i64::MIN` (sign + 19 digits).
const MAX_DIGITS: usize = 20;

/// Scratch space for one formatted integer.
pub(crate) struct Digits {
    buf: [u8; MAX_DIGITS],
}

impl Digits {
    pub(crate) fn new() -> Self {
        Self {
            buf: [0; MAX_DIGITS],
        }
    }

    /// Format `value` right-aligned in the scratch array and return the digits.
    pub(crate) fn unsigned(&mut self, mut value: u64) -> &[u8] {
        let mut start = MAX_DIGITS;
        loop {
            start -= 1;
            self.buf[start] = b'0' + (value % 10) as u8;
            value /= 10;
            if value == 0 {
                break;
            }
        }
        &self.buf[start..]
    }

    pub(crate) fn signed(&mut self, value: i64) -> &[u8] {
        if value >= 0 {
            return self.unsigned(value as u64);
        }
        let len = self.unsigned(value.unsigned_abs()).len();
        let start = MAX_DIGITS - len - 1;
        self.buf[start] = b'-';
        &self.buf[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_formats_as_single_digit() {
        assert_eq!(Digits::new().unsigned(0), b"0");
        assert_eq!(Digits::new().signed(0), b"0");
    }

    #[test]
    fn extremes_fit() {
        assert_eq!(Digits::new().unsigned(u64::MAX), b"18446744073709551615");
        assert_eq!(Digits::new().signed(i64::MIN), b"-9223372036854775808");
        assert_eq!(Digits::new().signed(i64::MAX), b"9223372036854775807");
    }

    #[test]
    fn scratch_is_reusable() {
        let mut d = Digits::new();
        assert_eq!(d.signed(-42), b"-42");
        assert_eq!(d.unsigned(7), b"7");
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn signed_matches_std(value in any::<i64>()) {
                let expected = value.to_string();
                let mut digits = Digits::new();
                prop_assert_eq!(digits.signed(value), expected.as_bytes());
            }

            #[test]
            fn unsigned_matches_std(value in any::<u64>()) {
                let expected = value.to_string();
                let mut digits = Digits::new();
                prop_assert_eq!(digits.unsigned(value), expected.as_bytes());
            }
        }
    }
}
