//! Save-format engine: parse a tag-sectioned save file and write it back
//! with field-level substitutions

pub mod parser;
pub mod render;
pub mod tokenizer;
pub mod value;
pub mod writer;

pub use parser::{Field, SavDocument, Section, HEAD_SECTION};
pub use value::{Cell, FieldValue, Table};
pub use writer::{serialize, write, Overrides};
