//! Field specs: which fields of a message to read, and as what

mod interpret;
mod node;
mod parser;

pub use interpret::{decode_with_spec, interpret};
pub use node::{MessageSpec, SpecNode};
pub use parser::parse_spec;
