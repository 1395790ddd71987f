use crate::Scalar;

/// Protobuf's "is this the field default" check. Default-valued singular
/// fields are never written to the wire.
pub trait IsDefault {
    fn is_default(&self) -> bool;
}

impl IsDefault for bool {
    #[inline(always)]
    fn is_default(&self) -> bool { !*self }
}

macro_rules! impl_is_default_zero {
    ($($ty:ty => $zero:expr),* $(,)?) => {
        $(
            impl IsDefault for $ty {
                #[inline(always)]
                fn is_default(&self) -> bool { *self == $zero }
            }
        )*
    };
}

// -0.0 == 0.0, so negative zero is elided too; NaN is never default.
impl_is_default_zero!(i32 => 0, i64 => 0, u32 => 0, u64 => 0, f32 => 0.0, f64 => 0.0);

impl IsDefault for str {
    #[inline(always)]
    fn is_default(&self) -> bool { self.is_empty() }
}

impl IsDefault for String {
    #[inline(always)]
    fn is_default(&self) -> bool { self.is_empty() }
}

impl IsDefault for [u8] {
    #[inline(always)]
    fn is_default(&self) -> bool { self.is_empty() }
}

impl<T> IsDefault for Vec<T> {
    #[inline(always)]
    fn is_default(&self) -> bool { self.is_empty() }
}

impl<T> IsDefault for Option<T> {
    #[inline(always)]
    fn is_default(&self) -> bool { self.is_none() }
}

impl IsDefault for Scalar {
    #[inline]
    fn is_default(&self) -> bool {
        match self {
            Scalar::String(s) => s.is_default(),
            Scalar::Bytes(b) => b.is_default(),
            Scalar::Bool(b) => b.is_default(),
            Scalar::Int(v) => v.is_default(),
            Scalar::UInt(v) => v.is_default(),
            Scalar::Float(v) => v.is_default(),
            Scalar::Double(v) => v.is_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_defaults() {
        assert!(Scalar::Int(0).is_default());
        assert!(Scalar::UInt(0).is_default());
        assert!(Scalar::Bool(false).is_default());
        assert!(Scalar::String(String::new()).is_default());
        assert!(Scalar::Bytes(Vec::new()).is_default());
        assert!(Scalar::Double(-0.0).is_default());
        assert!(!Scalar::Float(f32::NAN).is_default());
        assert!(!Scalar::Int(-1).is_default());
        assert!(!Scalar::Bool(true).is_default());
    }
}
