//! Fixed-width values that can be stored in an arena span.

use std::mem::{align_of, size_of};

mod sealed {
    pub trait Sealed {}
}

/// A plain fixed-width value with a native-endian byte encoding.
///
/// Sealed: implemented for the primitive integers and floats only, so an
/// arena span is never reinterpreted as anything with padding, invariants,
/// or pointers inside it.
pub trait Scalar: Copy + sealed::Sealed {
    /// Encoded size in bytes.
    const SIZE: usize;
    /// Required alignment of the encoded bytes.
    const ALIGN: usize;

    /// Encode into exactly [`SIZE`](Self::SIZE) bytes.
    fn encode(self, dst: &mut [u8]);

    /// Decode from exactly [`SIZE`](Self::SIZE) bytes.
    fn decode(src: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Scalar for $ty {
                const SIZE: usize = size_of::<$ty>();
                const ALIGN: usize = align_of::<$ty>();

                #[inline]
                fn encode(self, dst: &mut [u8]) {
                    dst.copy_from_slice(&self.to_ne_bytes());
                }

                #[inline]
                fn decode(src: &[u8]) -> Self {
                    let mut raw = [0u8; size_of::<$ty>()];
                    raw.copy_from_slice(src);
                    <$ty>::from_ne_bytes(raw)
                }
            }
        )*
    };
}

impl_scalar!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: Scalar + PartialEq + std::fmt::Debug>(value: T) {
        let mut buf = vec![0u8; T::SIZE];
        value.encode(&mut buf);
        assert_eq!(T::decode(&buf), value);
    }

    #[test]
    fn sizes_match_primitives() {
        assert_eq!(<i64 as Scalar>::SIZE, 8);
        assert_eq!(<f32 as Scalar>::SIZE, 4);
        assert_eq!(<u8 as Scalar>::ALIGN, 1);
        assert_eq!(<f64 as Scalar>::ALIGN, align_of::<f64>());
    }

    #[test]
    fn encodings_are_lossless() {
        round_trip(-100i64);
        round_trip(u64::MAX);
        round_trip(500.25f64);
        round_trip(f32::MIN_POSITIVE);
    }
}
