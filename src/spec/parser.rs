//! Field spec grammar
//!
//! ```text
//! spec  := field (',' field)*
//! field := NUMBER ':' (SCALAR | '[' spec ']' | '{' spec '}')
//! ```
//!
//! `[...]` holds exactly one field and marks it repeated; the number inside
//! is not used. `{...}` is a nested message. The whole text may be wrapped in
//! one pair of braces. Whitespace around tokens is ignored.

use proto_value::ScalarType;

use crate::{
    SpecError, SpecErrorKind,
    spec::node::{MessageSpec, SpecNode},
};

/// Parses a field spec into a tree.
///
/// Duplicate field numbers on one level keep the last definition.
///
/// # Example
///
/// ```
/// use protowire::{ScalarType, SpecNode, parse_spec};
///
/// let spec = parse_spec("2:string,3:{2:float,4:[1:sfixed32]}").unwrap();
/// assert_eq!(spec.get(2), Some(&SpecNode::Leaf(ScalarType::String)));
///
/// let Some(SpecNode::Message(nested)) = spec.get(3) else { panic!() };
/// assert_eq!(nested.get(2), Some(&SpecNode::Leaf(ScalarType::Float)));
/// assert_eq!(nested.get(4), Some(&SpecNode::repeated(ScalarType::Sfixed32.into())));
/// ```
pub fn parse_spec(text: &str) -> Result<MessageSpec, SpecError> {
    let text = text.trim();
    let body = match text.strip_prefix('{') {
        Some(_) if matching_close(text)? == text.len() - 1 => &text[1..text.len() - 1],
        _ => text,
    };
    let spec = parse_fields(body)?;
    tracing::trace!(fields = spec.len(), "parsed field spec");
    Ok(spec)
}

/// Index of the bracket closing the one `text` starts with.
///
/// Both bracket kinds share one stack, so `[1:{2:int]}` is unmatched.
fn matching_close(text: &str) -> Result<usize, SpecError> {
    let mut stack = Vec::new();
    for (i, c) in text.char_indices() {
        match c {
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ']' | '}' => {
                if stack.pop() != Some(c) {
                    return Err(SpecError::new(SpecErrorKind::UnmatchedBracket, &text[..=i]));
                }
                if stack.is_empty() {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(SpecError::new(SpecErrorKind::UnmatchedBracket, text))
}

fn parse_fields(text: &str) -> Result<MessageSpec, SpecError> {
    let mut spec = MessageSpec::new();
    let mut rest = text;
    loop {
        let (field_number, node, remaining) = parse_field(rest)?;
        spec.insert(field_number, node);

        let remaining = remaining.trim_start();
        if remaining.is_empty() {
            return Ok(spec);
        }
        match remaining.strip_prefix(',') {
            Some(next) => rest = next,
            None => return Err(SpecError::new(SpecErrorKind::MissingSeparator, remaining)),
        }
    }
}

/// Parses one field off the front of `text`, returning what follows it.
fn parse_field(text: &str) -> Result<(u32, SpecNode, &str), SpecError> {
    let text = text.trim_start();
    if text.is_empty() {
        return Err(SpecError::new(SpecErrorKind::EmptyField, text));
    }
    let Some((number, rest)) = text.split_once(':') else {
        return Err(SpecError::new(SpecErrorKind::MissingColon, text));
    };
    let field_number = parse_field_number(number)?;

    let rest = rest.trim_start();
    match rest.as_bytes().first() {
        Some(b'[') => {
            let close = matching_close(rest)?;
            let element = match parse_fields(&rest[1..close])?.into_single() {
                Some((_, SpecNode::Repeated(_))) => {
                    return Err(SpecError::new(SpecErrorKind::NestedRepeated, &rest[..=close]));
                }
                Some((_, element)) => element,
                None => {
                    return Err(SpecError::new(SpecErrorKind::RepeatedArity, &rest[..=close]));
                }
            };
            Ok((field_number, SpecNode::repeated(element), &rest[close + 1..]))
        }
        Some(b'{') => {
            let close = matching_close(rest)?;
            let nested = parse_fields(&rest[1..close])?;
            Ok((field_number, SpecNode::Message(nested), &rest[close + 1..]))
        }
        Some(b']' | b'}') => Err(SpecError::new(SpecErrorKind::UnmatchedBracket, rest)),
        _ => {
            let end = rest.find(',').unwrap_or(rest.len());
            let name = rest[..end].trim();
            if name.is_empty() {
                return Err(SpecError::new(SpecErrorKind::EmptyField, text));
            }
            match ScalarType::from_name(name) {
                Some(scalar_type) => Ok((field_number, SpecNode::Leaf(scalar_type), &rest[end..])),
                None => Err(SpecError::new(SpecErrorKind::UnknownScalar, name)),
            }
        }
    }
}

/// Field numbers are decimal and at least 1; `"01"` and `"1"` are the same.
fn parse_field_number(text: &str) -> Result<u32, SpecError> {
    let text = text.trim();
    match text.parse::<u32>() {
        Ok(n) if n > 0 && text.bytes().all(|b| b.is_ascii_digit()) => Ok(n),
        _ => Err(SpecError::new(SpecErrorKind::InvalidFieldNumber, text)),
    }
}
