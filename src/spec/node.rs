use std::collections::{BTreeMap, btree_map};

use proto_value::ScalarType;

use crate::{SpecError, spec::parser::parse_spec};

/// How to read one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecNode {
    Leaf(ScalarType),
    /// Each occurrence of the field is one element read with the inner node.
    Repeated(Box<SpecNode>),
    Message(MessageSpec),
}

impl SpecNode {
    /// Wraps `element` as a repeated field.
    ///
    /// A repeated `element` builds a list of lists. Such a node renders, but
    /// the grammar has no form for it and the text does not parse back.
    #[inline]
    pub fn repeated(element: SpecNode) -> Self { Self::Repeated(Box::new(element)) }

    /// Whether [`Display`](core::fmt::Display) output parses back to this node.
    pub fn is_parsable(&self) -> bool {
        match self {
            Self::Leaf(_) => true,
            Self::Repeated(element) => {
                !matches!(**element, Self::Repeated(_)) && element.is_parsable()
            }
            Self::Message(spec) => spec.is_parsable(),
        }
    }
}

impl From<ScalarType> for SpecNode {
    #[inline]
    fn from(scalar_type: ScalarType) -> Self { Self::Leaf(scalar_type) }
}

impl From<MessageSpec> for SpecNode {
    #[inline]
    fn from(spec: MessageSpec) -> Self { Self::Message(spec) }
}

impl core::fmt::Display for SpecNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Leaf(scalar_type) => f.write_str(scalar_type.as_str()),
            // the element's own field number is never read back, 1 is canonical
            Self::Repeated(element) => write!(f, "[1:{element}]"),
            Self::Message(spec) => write!(f, "{{{spec}}}"),
        }
    }
}

/// Field number → node map describing one message level.
///
/// Parsed from text such as `2:string,3:{2:float,4:[1:sfixed32]}` and printed
/// back in the same grammar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageSpec {
    fields: BTreeMap<u32, SpecNode>,
}

impl MessageSpec {
    #[inline]
    pub fn new() -> Self { Self { fields: BTreeMap::new() } }

    /// Parses the field spec grammar, see [`parse_spec`].
    #[inline]
    pub fn parse(text: &str) -> Result<Self, SpecError> { parse_spec(text) }

    #[inline]
    pub fn get(&self, field_number: u32) -> Option<&SpecNode> { self.fields.get(&field_number) }

    /// Sets the node of a field, returning the one it replaces.
    #[inline]
    pub fn insert(&mut self, field_number: u32, node: impl Into<SpecNode>) -> Option<SpecNode> {
        self.fields.insert(field_number, node.into())
    }

    /// Builder form of [`insert`](Self::insert).
    #[inline]
    pub fn with(mut self, field_number: u32, node: impl Into<SpecNode>) -> Self {
        self.insert(field_number, node);
        self
    }

    /// Whether the rendered text parses back to an equal spec. False for an
    /// empty spec and for any list of lists.
    pub fn is_parsable(&self) -> bool {
        !self.is_empty() && self.fields.values().all(SpecNode::is_parsable)
    }

    #[inline]
    pub fn len(&self) -> usize { self.fields.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    #[inline]
    pub fn iter(&self) -> btree_map::Iter<'_, u32, SpecNode> { self.fields.iter() }

    #[inline]
    pub(crate) fn into_single(self) -> Option<(u32, SpecNode)> {
        if self.fields.len() != 1 {
            return None;
        }
        self.fields.into_iter().next()
    }
}

impl<'a> IntoIterator for &'a MessageSpec {
    type Item = (&'a u32, &'a SpecNode);
    type IntoIter = btree_map::Iter<'a, u32, SpecNode>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter { self.fields.iter() }
}

impl FromIterator<(u32, SpecNode)> for MessageSpec {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (u32, SpecNode)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

impl core::str::FromStr for MessageSpec {
    type Err = SpecError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> { parse_spec(s) }
}

impl core::fmt::Display for MessageSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, (field_number, node)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{field_number}:{node}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let spec = MessageSpec::new()
            .with(2, ScalarType::String)
            .with(
                3,
                MessageSpec::new()
                    .with(2, ScalarType::Float)
                    .with(4, SpecNode::repeated(ScalarType::Sfixed32.into())),
            );
        assert_eq!(spec.to_string(), "2:string,3:{2:float,4:[1:sfixed32]}");
    }

    #[test]
    fn test_display_reparses() {
        let element = MessageSpec::new()
            .with(1, ScalarType::Bytes)
            .with(9, SpecNode::repeated(ScalarType::Sint64.into()));
        let spec = MessageSpec::new()
            .with(1, SpecNode::repeated(element.into()))
            .with(8, ScalarType::Bool);
        assert_eq!(spec.to_string(), "1:[1:{1:bytes,9:[1:sint64]}],8:bool");
        assert_eq!(spec.to_string().parse::<MessageSpec>().unwrap(), spec);
    }

    #[test]
    fn test_list_of_lists_does_not_reparse() {
        let nested = SpecNode::repeated(SpecNode::repeated(ScalarType::Int.into()));
        let spec = MessageSpec::new().with(1, nested);
        assert_eq!(spec.to_string(), "1:[1:[1:int]]");
        assert!(!spec.is_parsable());
        assert_eq!(
            spec.to_string().parse::<MessageSpec>().unwrap_err().kind,
            crate::SpecErrorKind::NestedRepeated
        );

        let flat = MessageSpec::new().with(1, SpecNode::repeated(ScalarType::Int.into()));
        assert!(flat.is_parsable());
        assert!(!MessageSpec::new().is_parsable());
        assert!(!MessageSpec::new().with(2, MessageSpec::new()).is_parsable());
    }

    #[test]
    fn test_insert_replaces() {
        let mut spec = MessageSpec::new();
        assert_eq!(spec.insert(1, ScalarType::Int), None);
        assert_eq!(spec.insert(1, ScalarType::Bool), Some(SpecNode::Leaf(ScalarType::Int)));
        assert_eq!(spec.len(), 1);
        assert_eq!(spec.get(1), Some(&SpecNode::Leaf(ScalarType::Bool)));
    }
}
