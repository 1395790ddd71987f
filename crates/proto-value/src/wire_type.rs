use crate::DecodeError;

/// Number of low tag bits holding the wire type.
pub const WIRE_TYPE_BITS: u32 = 3;
/// Mask selecting the wire type from a tag.
pub const WIRE_TYPE_MASK: u64 = 0b111;

/// Represent the wire type for protobuf encoding.
///
/// The integer value is equivalent with the encoded value. Only the four
/// non-group wire types exist here; group markers are rejected on decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    SixtyFourBit = 1,
    LengthDelimited = 2,
    ThirtyTwoBit = 5,
}

impl WireType {
    #[inline]
    pub const fn try_from(value: u8) -> Option<Self> {
        match value {
            0 => Some(WireType::Varint),
            1 => Some(WireType::SixtyFourBit),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::ThirtyTwoBit),
            _ => None,
        }
    }

    /// Splits a decoded tag into `(wire_type, field_number)`.
    pub fn try_from_tag(tag: u64) -> Result<(Self, u32), DecodeError> {
        let value = (tag & WIRE_TYPE_MASK) as u8;
        let field_number = tag >> WIRE_TYPE_BITS;
        let Ok(field_number) = u32::try_from(field_number) else {
            return Err(DecodeError::FieldNumberOverflow { tag });
        };
        match Self::try_from(value) {
            Some(wire_type) => Ok((wire_type, field_number)),
            None => Err(DecodeError::UnsupportedWireType { field_number, wire_type: value }),
        }
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            WireType::Varint => "varint",
            WireType::SixtyFourBit => "fixed64",
            WireType::LengthDelimited => "length-delimited",
            WireType::ThirtyTwoBit => "fixed32",
        }
    }
}

impl core::fmt::Display for WireType {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({})", self.as_str(), *self as u8)
    }
}

/// Checks that the expected wire type matches the actual wire type,
/// or returns an error result.
#[inline]
pub fn check_wire_type(
    field_number: u32,
    expected: WireType,
    actual: WireType,
) -> Result<(), DecodeError> {
    if expected != actual {
        tracing::debug!(field_number, %expected, %actual, "wire type mismatch");
        return Err(DecodeError::WireTypeMismatch { field_number, expected, actual });
    }
    Ok(())
}
