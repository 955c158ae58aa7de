//! Template-replay serializer
//!
//! Output is produced by walking the original lines once. A field whose
//! `(section, name)` has an override is replaced by the override lines and
//! the rest of its original block is skipped; every other line is copied.

use std::path::Path;

use ahash::AHashMap;

use crate::core::error::Result;

use super::parser::SavDocument;

/// Field substitutions keyed by `(section, field)`
///
/// Each override is the complete list of output lines for the field,
/// header included. An empty list deletes the field.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    entries: AHashMap<(String, String), Vec<String>>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, section: &str, field: &str, lines: Vec<String>) {
        self.entries
            .insert((section.to_string(), field.to_string()), lines);
    }

    pub fn replace_line(&mut self, section: &str, field: &str, line: String) {
        self.replace(section, field, vec![line]);
    }

    pub fn delete(&mut self, section: &str, field: &str) {
        self.replace(section, field, Vec::new());
    }

    pub fn get(&self, section: &str, field: &str) -> Option<&[String]> {
        self.entries
            .get(&(section.to_string(), field.to_string()))
            .map(Vec::as_slice)
    }

    pub fn contains(&self, section: &str, field: &str) -> bool {
        self.get(section, field).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge another set; its entries win on conflict
    pub fn extend(&mut self, other: Overrides) {
        self.entries.extend(other.entries);
    }
}

pub fn serialize(doc: &SavDocument, overrides: &Overrides) -> String {
    let lines = doc.lines();
    let mut out = String::new();

    for section in doc.sections() {
        let mut i = section.span.start;
        if !section.is_head() {
            push_line(&mut out, &lines[i]);
            i += 1;
        }
        let mut fields = section.fields().iter().peekable();
        while i < section.span.end {
            match fields.peek() {
                Some(field) if field.span.start == i => {
                    match overrides.get(&section.name, &field.name) {
                        Some(replacement) => {
                            replacement.iter().for_each(|l| push_line(&mut out, l))
                        }
                        None => lines[field.span.clone()]
                            .iter()
                            .for_each(|l| push_line(&mut out, l)),
                    }
                    i = field.span.end;
                    fields.next();
                }
                _ => {
                    push_line(&mut out, &lines[i]);
                    i += 1;
                }
            }
        }
    }
    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

pub fn write(path: &Path, doc: &SavDocument, overrides: &Overrides) -> Result<()> {
    std::fs::write(path, serialize(doc, overrides))?;
    tracing::info!(path = %path.display(), overrides = overrides.len(), "Wrote save file");
    Ok(())
}
