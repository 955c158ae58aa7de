//! Save-file parser
//!
//! The document keeps every normalized input line. Sections and fields are
//! an index over those lines: each field records the span it occupies so the
//! writer can replay the file and substitute whole fields.

use std::ops::Range;
use std::path::Path;

use ahash::AHashMap;

use crate::core::error::{Result, ScenarioError};

use super::tokenizer::{field_header, parse_row, series_key, tag_name};
use super::value::{FieldValue, Table};

/// Name of the implicit section holding lines before the first tag
pub const HEAD_SECTION: &str = "__head__";

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
    /// Lines occupied by the field, header line first
    pub span: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    /// Lines of the section, tag line included
    pub span: Range<usize>,
    fields: Vec<Field>,
    index: AHashMap<String, usize>,
}

impl Section {
    fn new(name: &str, span: Range<usize>, fields: Vec<Field>) -> Self {
        // Later duplicates shadow earlier ones for lookup
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        Self { name: name.to_string(), span, fields, index }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn is_head(&self) -> bool {
        self.name == HEAD_SECTION
    }
}

#[derive(Debug, Clone)]
pub struct SavDocument {
    lines: Vec<String>,
    sections: Vec<Section>,
    index: AHashMap<String, usize>,
    players: Vec<String>,
}

impl SavDocument {
    /// Read and parse an uncompressed save file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        // Tag lines split the document before any field is looked at
        let mut bounds: Vec<(&str, usize)> = vec![(HEAD_SECTION, 0)];
        for (i, line) in lines.iter().enumerate() {
            if let Some(name) = tag_name(line) {
                bounds.push((name, i));
            }
        }

        let mut sections = Vec::with_capacity(bounds.len());
        for (n, &(name, start)) in bounds.iter().enumerate() {
            let end = bounds.get(n + 1).map(|b| b.1).unwrap_or(lines.len());
            let body_start = if n == 0 { start } else { start + 1 };
            let fields = parse_fields(&lines, body_start..end)?;
            sections.push(Section::new(name, start..end, fields));
        }

        let index = sections
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();
        let players = sections
            .iter()
            .filter(|s| is_player_section(&s.name))
            .map(|s| s.name.clone())
            .collect();

        tracing::debug!(
            lines = lines.len(),
            sections = sections.len(),
            "Parsed save document"
        );

        Ok(Self { lines, sections, index, players })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The ingested text: trimmed, non-blank lines, newline-terminated
    pub fn normalized(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.index.get(name).map(|&i| &self.sections[i])
    }

    pub fn field(&self, section: &str, name: &str) -> Option<&Field> {
        self.section(section)?.field(name)
    }

    /// Player section names (`player` followed by digits), in file order
    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// Text of the first cell of a single-line field
    pub fn scalar(&self, section: &str, name: &str) -> Option<&str> {
        self.field(section, name)?
            .value
            .first_cell()
            .map(|c| c.text.as_str())
    }

    /// `(key, text)` of every row in the series `prefix` + 4-digit index,
    /// ordered by index
    pub fn rows_with_prefix(&self, section: &str, prefix: &str) -> Vec<(&str, &str)> {
        let Some(section) = self.section(section) else {
            return Vec::new();
        };
        let mut rows: Vec<(usize, &str, &str)> = section
            .fields()
            .iter()
            .filter_map(|f| {
                let (series, index) = series_key(&f.name)?;
                if series != prefix {
                    return None;
                }
                let cell = f.value.first_cell()?;
                Some((index, f.name.as_str(), cell.text.as_str()))
            })
            .collect();
        rows.sort_by_key(|r| r.0);
        rows.into_iter().map(|(_, k, t)| (k, t)).collect()
    }

    /// Lower-cased terrain name to map character, from `[savefile] terrident`
    pub fn terrain_idents(&self) -> AHashMap<String, char> {
        let mut idents = AHashMap::new();
        let Some(table) = self
            .field("savefile", "terrident")
            .and_then(|f| f.value.as_table())
        else {
            return idents;
        };
        if let (Some(names), Some(chars)) = (table.column("name"), table.column("identifier")) {
            for (name, ident) in names.into_iter().zip(chars) {
                if let Some(c) = ident.chars().next() {
                    idents.insert(name.to_lowercase(), c);
                }
            }
        }
        idents
    }
}

fn is_player_section(name: &str) -> bool {
    name.strip_prefix("player")
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

fn parse_fields(lines: &[String], body: Range<usize>) -> Result<Vec<Field>> {
    let mut fields = Vec::new();
    let mut i = body.start;
    while i < body.end {
        // Anything that is not `name=` is filler and stays in the line stream
        let Some((name, rest)) = field_header(&lines[i]) else {
            i += 1;
            continue;
        };
        let (value, end) = if let Some(rest) = rest.strip_prefix('$') {
            parse_code(lines, i, rest, body.end)?
        } else if let Some(rest) = rest.strip_prefix('{') {
            parse_table(lines, i, rest, body.end)?
        } else {
            (FieldValue::Row(parse_row(rest)), i + 1)
        };
        fields.push(Field { name: name.to_string(), value, span: i..end });
        i = end;
    }
    Ok(fields)
}

fn parse_code(
    lines: &[String],
    start: usize,
    first: &str,
    limit: usize,
) -> Result<(FieldValue, usize)> {
    let mut parts: Vec<&str> = Vec::new();
    let mut segment = first;
    let mut i = start;
    loop {
        if let Some(body) = segment.strip_suffix('$') {
            parts.push(body);
            return Ok((FieldValue::Code(parts.join("\n")), i + 1));
        }
        if i > start || !segment.is_empty() {
            parts.push(segment);
        }
        i += 1;
        if i >= limit {
            return Err(ScenarioError::Format {
                line: start + 1,
                reason: "code block has no closing `$`".into(),
            });
        }
        segment = &lines[i];
    }
}

fn parse_table(
    lines: &[String],
    start: usize,
    first: &str,
    limit: usize,
) -> Result<(FieldValue, usize)> {
    let mut body: Vec<&str> = Vec::new();
    let mut segment = first;
    let mut i = start;
    loop {
        if let Some(head) = segment.strip_suffix('}') {
            if !head.is_empty() {
                body.push(head);
            }
            break;
        }
        body.push(segment);
        i += 1;
        if i >= limit {
            return Err(ScenarioError::Format {
                line: start + 1,
                reason: "table block has no closing `}`".into(),
            });
        }
        segment = &lines[i];
    }
    Ok((table_value(&body, start), i + 1))
}

/// Header row plus data rows; rows wider than the header make the block raw
fn table_value(body: &[&str], start: usize) -> FieldValue {
    let Some((header, data)) = body.split_first() else {
        return FieldValue::RawTable(Vec::new());
    };
    let columns: Vec<String> = parse_row(header).into_iter().map(|c| c.text).collect();

    let mut rows = Vec::with_capacity(data.len());
    for line in data {
        let mut cells = parse_row(line);
        if cells.len() > columns.len() {
            tracing::warn!(
                line = start + 1,
                columns = columns.len(),
                cells = cells.len(),
                "Table row wider than header, keeping raw lines"
            );
            return FieldValue::RawTable(body.iter().map(|l| l.to_string()).collect());
        }
        cells.resize(columns.len(), super::value::Cell::bare(""));
        rows.push(cells);
    }
    FieldValue::Table(Table { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sav::value::Cell;

    const SAMPLE: &str = "\
; generated
[savefile]
options=\" +version3\"
terrident={\"name\",\"identifier\"
\"Inaccessible\",\"i\"
\"Grassland\",\"g\"
}

[game]
turn=12
name=\"Lost World\"
[script]
code=$-- hello
print(1)$
[map]
t0001=\"gg\"
t0000=\"aa\"
[player0]
name=\"Ann\"
[player_info]
x=1
";

    #[test]
    fn test_sections_and_players() {
        let doc = SavDocument::parse(SAMPLE).unwrap();
        let names: Vec<&str> = doc.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![HEAD_SECTION, "savefile", "game", "script", "map", "player0", "player_info"]
        );
        assert_eq!(doc.players(), &["player0".to_string()]);
        assert_eq!(doc.scalar("game", "turn"), Some("12"));
        assert_eq!(doc.scalar("game", "name"), Some("Lost World"));
    }

    #[test]
    fn test_blank_lines_dropped_and_trimmed() {
        let doc = SavDocument::parse("  [a]  \r\n\r\n  x=1 \n").unwrap();
        assert_eq!(doc.lines(), &["[a]".to_string(), "x=1".to_string()]);
        assert_eq!(doc.normalized(), "[a]\nx=1\n");
    }

    #[test]
    fn test_table_and_idents() {
        let doc = SavDocument::parse(SAMPLE).unwrap();
        let field = doc.field("savefile", "terrident").unwrap();
        assert_eq!(field.span, 3..7);
        let table = field.value.as_table().unwrap();
        assert_eq!(table.columns, vec!["name", "identifier"]);
        assert_eq!(table.rows[1], vec![Cell::quoted("Grassland"), Cell::quoted("g")]);

        let idents = doc.terrain_idents();
        assert_eq!(idents.get("grassland"), Some(&'g'));
        assert_eq!(idents.get("inaccessible"), Some(&'i'));
    }

    #[test]
    fn test_code_block_excludes_terminators() {
        let doc = SavDocument::parse(SAMPLE).unwrap();
        let field = doc.field("script", "code").unwrap();
        assert_eq!(field.value.as_code(), Some("-- hello\nprint(1)"));
        assert_eq!(field.span.len(), 2);
    }

    #[test]
    fn test_rows_with_prefix_sorted_by_index() {
        let doc = SavDocument::parse(SAMPLE).unwrap();
        let rows = doc.rows_with_prefix("map", "t");
        assert_eq!(rows, vec![("t0000", "aa"), ("t0001", "gg")]);
        assert!(doc.rows_with_prefix("map", "e00").is_empty());
    }

    #[test]
    fn test_unterminated_code_block_is_format_error() {
        let result = SavDocument::parse("[a]\nx=$never\nclosed\n[b]\ny=1");
        match result {
            Err(ScenarioError::Format { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_table_is_format_error() {
        let result = SavDocument::parse("[a]\nx={\"c\"\n1\n");
        assert!(matches!(result, Err(ScenarioError::Format { .. })));
    }

    #[test]
    fn test_ragged_table_falls_back_to_raw_lines() {
        let doc = SavDocument::parse("[a]\nx={\"c1\",\"c2\"\n1,2,3\n}\ny={\"c1\",\"c2\"\n1\n}").unwrap();
        assert_eq!(
            doc.field("a", "x").unwrap().value,
            FieldValue::RawTable(vec!["\"c1\",\"c2\"".into(), "1,2,3".into()])
        );
        let short = doc.field("a", "y").unwrap().value.as_table().unwrap().clone();
        assert_eq!(short.rows, vec![vec![Cell::bare("1"), Cell::bare("")]]);
    }

    #[test]
    fn test_malformed_tag_is_filler() {
        let doc = SavDocument::parse("[a]\n[oops\nx=1").unwrap();
        assert_eq!(doc.sections().len(), 2);
        assert_eq!(doc.scalar("a", "x"), Some("1"));
    }
}
