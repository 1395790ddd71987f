use std::collections::BTreeMap;

use crate::Scalar;

/// Field number → value map of a decoded message.
pub type Fields = BTreeMap<u32, Value>;

/// Structured result of decoding a message against a field spec.
///
/// Only fields present on the wire appear in a `Message`; nothing is filled in
/// with defaults.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Value>),
    Message(Fields),
}

impl Value {
    #[inline]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_message(&self) -> Option<&Fields> {
        match self {
            Self::Message(fields) => Some(fields),
            _ => None,
        }
    }

    /// Looks up a field of a `Message`; `None` for other variants.
    #[inline]
    pub fn get(&self, field_number: u32) -> Option<&Value> {
        self.as_message().and_then(|fields| fields.get(&field_number))
    }
}

impl From<Scalar> for Value {
    #[inline]
    fn from(value: Scalar) -> Self { Self::Scalar(value) }
}

impl From<Fields> for Value {
    #[inline]
    fn from(fields: Fields) -> Self { Self::Message(fields) }
}
