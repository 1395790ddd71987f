//! `Serialize` for decoded values, the hand-off to whatever renders them.
//!
//! Message keys are written as decimal strings and `bytes` as standard
//! padded base64, so the output maps cleanly onto JSON.

use serde::ser::{Serialize, SerializeMap as _, SerializeSeq as _, Serializer};

use crate::{Scalar, ScalarType, Value};

impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Bytes(b) => serializer.serialize_str(&base64_simd::STANDARD.encode_to_string(b)),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::UInt(v) => serializer.serialize_u64(*v),
            Self::Float(v) => serializer.serialize_f32(*v),
            Self::Double(v) => serializer.serialize_f64(*v),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        match self {
            Self::Scalar(scalar) => scalar.serialize(serializer),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Message(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                let mut key = itoa::Buffer::new();
                for (field_number, value) in fields {
                    map.serialize_entry(key.format(*field_number), value)?;
                }
                map.end()
            }
        }
    }
}

impl Serialize for ScalarType {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Fields, Scalar, ScalarType, Value};

    #[test]
    fn test_serialize_message() {
        let mut inner = Fields::new();
        inner.insert(2, Value::Scalar(Scalar::Double(1.5)));
        inner.insert(4, Value::List(vec![Value::Scalar(Scalar::Int(-1)), Value::Scalar(Scalar::Int(7))]));
        let mut fields = Fields::new();
        fields.insert(2, Value::Scalar(Scalar::String("hi".into())));
        fields.insert(3, Value::Message(inner));
        fields.insert(10, Value::Scalar(Scalar::Bytes(vec![0xde, 0xad, 0xbe, 0xef])));

        let json = serde_json::to_value(Value::Message(fields)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "2": "hi",
                "3": { "2": 1.5, "4": [-1, 7] },
                "10": "3q2+7w==",
            })
        );
    }

    #[test]
    fn test_serialize_scalars() {
        assert_eq!(serde_json::to_string(&Scalar::UInt(u64::MAX)).unwrap(), "18446744073709551615");
        assert_eq!(serde_json::to_string(&Scalar::Bool(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&ScalarType::Sfixed32).unwrap(), "\"sfixed32\"");
    }
}
