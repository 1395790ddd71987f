//! Applies a field spec to a record stream

use std::io::Read;

use proto_value::{
    DecodeError, Fields, Payload, Record, Value, WireType, decode_packed, decode_stream,
    wire_type::check_wire_type,
};

use crate::spec::node::{MessageSpec, SpecNode};

/// Reads `reader` to the end, keeping the fields `spec` names.
///
/// Fields missing from `spec` are skipped, fields missing from the stream are
/// absent from the result. For a field read more than once the last
/// occurrence wins, unless it is repeated, in which case every occurrence is
/// appended in stream order.
///
/// # Example
///
/// ```
/// use protowire::{Scalar, ScalarType, Value, encode_message, interpret, parse_spec};
///
/// let mut bytes = encode_message(2, ScalarType::String, "name").unwrap();
/// bytes.extend(encode_message(5, ScalarType::Bool, true).unwrap());
///
/// let value = interpret(&bytes[..], &parse_spec("2:string").unwrap()).unwrap();
/// assert_eq!(value.get(2), Some(&Value::Scalar(Scalar::String("name".into()))));
/// assert_eq!(value.get(5), None);
/// ```
#[inline]
pub fn interpret<R: Read>(reader: R, spec: &MessageSpec) -> Result<Value, DecodeError> {
    interpret_fields(reader, spec).map(Value::Message)
}

/// [`interpret`] over an in-memory message.
#[inline]
pub fn decode_with_spec(bytes: &[u8], spec: &MessageSpec) -> Result<Value, DecodeError> {
    interpret(bytes, spec)
}

fn interpret_fields<R: Read>(reader: R, spec: &MessageSpec) -> Result<Fields, DecodeError> {
    let mut fields = Fields::new();
    for record in decode_stream(reader) {
        let record = record?;
        let field_number = record.field_number;
        let Some(node) = spec.get(field_number) else {
            tracing::trace!(field_number, "skipping field outside spec");
            continue;
        };
        match node {
            SpecNode::Repeated(element) => {
                let entry = fields.entry(field_number).or_insert_with(|| Value::List(Vec::new()));
                if let Value::List(items) = entry {
                    read_element(record, element, items)?;
                }
            }
            SpecNode::Leaf(_) | SpecNode::Message(_) => {
                fields.insert(field_number, read_single(record, node)?);
            }
        }
    }
    Ok(fields)
}

fn read_single(record: Record, node: &SpecNode) -> Result<Value, DecodeError> {
    match node {
        SpecNode::Leaf(scalar_type) => Ok(Value::Scalar(record.decode_scalar(*scalar_type)?)),
        SpecNode::Message(spec) => {
            let field_number = record.field_number;
            check_wire_type(field_number, WireType::LengthDelimited, record.wire_type())?;
            let bytes = record.into_bytes().unwrap_or_default();
            Ok(Value::Message(interpret_fields(&bytes[..], spec)?))
        }
        SpecNode::Repeated(element) => {
            let mut items = Vec::new();
            read_element(record, element, &mut items)?;
            Ok(Value::List(items))
        }
    }
}

/// Appends the element(s) one occurrence of a repeated field carries.
///
/// A length-delimited occurrence of a packable scalar is a packed run of
/// elements; every other occurrence is exactly one element.
fn read_element(record: Record, element: &SpecNode, items: &mut Vec<Value>) -> Result<(), DecodeError> {
    if let (&SpecNode::Leaf(scalar_type), Payload::LengthDelimited(bytes)) = (element, &record.payload)
    {
        if scalar_type.is_packable() {
            let values = decode_packed(record.field_number, scalar_type, bytes)?;
            items.extend(values.into_iter().map(Value::Scalar));
            return Ok(());
        }
    }
    items.push(read_single(record, element)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parser::parse_spec;
    use proto_value::{Scalar, ScalarType, encode_message};

    fn decode(bytes: &[u8], spec: &str) -> Result<Value, DecodeError> {
        decode_with_spec(bytes, &parse_spec(spec).unwrap())
    }

    fn scalar(value: impl Into<Scalar>) -> Value { Value::Scalar(value.into()) }

    #[test]
    fn test_nested_message() {
        let mut inner = encode_message(2, ScalarType::Float, 1.5f32).unwrap();
        inner.extend(encode_message(4, ScalarType::Sfixed32, -7).unwrap());
        inner.extend(encode_message(4, ScalarType::Sfixed32, 9).unwrap());

        let mut bytes = encode_message(2, ScalarType::String, "outer").unwrap();
        bytes.extend(encode_message(3, ScalarType::Bytes, Scalar::Bytes(inner)).unwrap());

        let value = decode(&bytes, "2:string,3:{2:float,4:[1:sfixed32]}").unwrap();
        assert_eq!(value.get(2), Some(&scalar("outer")));
        let nested = value.get(3).unwrap();
        assert_eq!(nested.get(2), Some(&scalar(1.5f32)));
        assert_eq!(
            nested.get(4),
            Some(&Value::List(vec![scalar(Scalar::Int(-7)), scalar(Scalar::Int(9))]))
        );
    }

    #[test]
    fn test_unknown_and_missing_fields() {
        let mut bytes = encode_message(1, ScalarType::Int, 5).unwrap();
        bytes.extend(encode_message(9, ScalarType::Double, 2.0).unwrap());
        let value = decode(&bytes, "1:int,2:string").unwrap();
        let Value::Message(fields) = value else { panic!("expected message") };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get(&1), Some(&scalar(Scalar::UInt(5))));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let mut bytes = encode_message(1, ScalarType::Sint64, -1).unwrap();
        bytes.extend(encode_message(1, ScalarType::Sint64, -2).unwrap());
        assert_eq!(decode(&bytes, "1:sint64").unwrap().get(1), Some(&scalar(Scalar::Int(-2))));
    }

    #[test]
    fn test_packed_round_trip() {
        let cases: [(ScalarType, Vec<Scalar>); 4] = [
            (ScalarType::Int64, vec![Scalar::UInt(1), Scalar::UInt(u64::MAX), Scalar::UInt(0)]),
            (ScalarType::Sint64, vec![Scalar::Int(i64::MIN), Scalar::Int(3)]),
            (ScalarType::Fixed32, vec![Scalar::UInt(7), Scalar::UInt(u64::from(u32::MAX))]),
            (ScalarType::Double, vec![Scalar::Double(0.5), Scalar::Double(-1e300)]),
        ];
        for (scalar_type, values) in cases {
            let bytes = encode_message(6, scalar_type, values.clone()).unwrap();
            let value = decode(&bytes, &format!("6:[1:{scalar_type}]")).unwrap();
            let expected: Vec<_> = values.into_iter().map(Value::Scalar).collect();
            assert_eq!(value.get(6), Some(&Value::List(expected)));
        }
    }

    #[test]
    fn test_empty_list_is_absent() {
        let bytes = encode_message(6, ScalarType::Int32, Vec::<i32>::new()).unwrap();
        assert!(bytes.is_empty());
        assert_eq!(decode(&bytes, "6:[1:int32]").unwrap(), Value::Message(Fields::new()));
    }

    #[test]
    fn test_unpacked_strings() {
        let mut bytes = encode_message(3, ScalarType::String, "a").unwrap();
        bytes.extend(encode_message(1, ScalarType::Bool, true).unwrap());
        bytes.extend(encode_message(3, ScalarType::String, "b").unwrap());
        let value = decode(&bytes, "3:[1:string],1:bool").unwrap();
        assert_eq!(value.get(3), Some(&Value::List(vec![scalar("a"), scalar("b")])));
        assert_eq!(value.get(1), Some(&scalar(true)));
    }

    #[test]
    fn test_repeated_messages() {
        let first = encode_message(1, ScalarType::Int, 1).unwrap();
        let second = encode_message(1, ScalarType::Int, 2).unwrap();
        let mut bytes = encode_message(4, ScalarType::Bytes, Scalar::Bytes(first)).unwrap();
        bytes.extend(encode_message(4, ScalarType::Bytes, Scalar::Bytes(second)).unwrap());

        let value = decode(&bytes, "4:[1:{1:int}]").unwrap();
        let items = value.get(4).and_then(Value::as_list).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get(1), Some(&scalar(Scalar::UInt(1))));
        assert_eq!(items[1].get(1), Some(&scalar(Scalar::UInt(2))));
    }

    #[test]
    fn test_wire_type_mismatch() {
        let bytes = encode_message(2, ScalarType::Int, 3).unwrap();
        assert!(matches!(
            decode(&bytes, "2:string"),
            Err(DecodeError::WireTypeMismatch {
                field_number: 2,
                expected: WireType::LengthDelimited,
                actual: WireType::Varint,
            })
        ));
        assert!(matches!(
            decode(&bytes, "2:{1:int}"),
            Err(DecodeError::WireTypeMismatch { field_number: 2, .. })
        ));
    }

    #[test]
    fn test_invalid_payloads() {
        assert!(matches!(
            decode(b"\x08\x02", "1:bool"),
            Err(DecodeError::InvalidBool { field_number: 1, value: 2 })
        ));
        assert!(matches!(
            decode(b"\x0a\x01\xff", "1:string"),
            Err(DecodeError::InvalidUtf8 { field_number: 1, .. })
        ));
        assert!(decode(b"\x0a\x05ab", "1:string").unwrap_err().is_truncated());
    }

    #[test]
    fn test_int_fields_keep_full_varint() {
        let bytes = b"\x08\xff\xff\xff\xff\xff\xff\xff\xff\xff\x01\x10\x80\x80\x80\x80\x10";
        let value = decode(bytes, "1:int64,2:int32").unwrap();
        assert_eq!(value.get(1), Some(&scalar(Scalar::UInt(u64::MAX))));
        assert_eq!(value.get(2), Some(&scalar(Scalar::UInt(1 << 32))));
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(decode(b"", "1:int").unwrap(), Value::Message(Fields::new()));
    }

    #[test]
    fn test_serialize_result() {
        let mut bytes = encode_message(1, ScalarType::Bytes, Scalar::Bytes(vec![0xde, 0xad])).unwrap();
        bytes.extend(encode_message(2, ScalarType::Sint32, vec![-1, 1]).unwrap());
        let value = decode(&bytes, "1:bytes,2:[1:sint32]").unwrap();
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            serde_json::json!({ "1": "3q0=", "2": [-1, 1] })
        );
    }
}
