//! Line-level tokenizing: tag lines, field headers and CSV-like rows

use nom::branch::alt;
use nom::bytes::complete::{tag, take_till};
use nom::combinator::{all_consuming, map};
use nom::multi::separated_list1;
use nom::sequence::delimited;
use nom::{IResult, Parser};

use super::value::Cell;

/// Section name of a `[name]` line
pub fn tag_name(line: &str) -> Option<&str> {
    if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
        Some(&line[1..line.len() - 1])
    } else {
        None
    }
}

/// Split `name=rest` when the name is made of `[.a-zA-Z0-9_-]`
pub fn field_header(line: &str) -> Option<(&str, &str)> {
    let eq = line.find('=')?;
    let name = &line[..eq];
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    valid.then(|| (name, &line[eq + 1..]))
}

fn quoted_cell(input: &str) -> IResult<&str, Cell> {
    map(
        delimited(tag("\""), take_till(|c| c == '"'), tag("\"")),
        Cell::quoted,
    )
    .parse(input)
}

fn bare_cell(input: &str) -> IResult<&str, Cell> {
    map(take_till(|c| c == ',' || c == '"'), Cell::bare).parse(input)
}

fn cells(input: &str) -> IResult<&str, Vec<Cell>> {
    separated_list1(tag(","), alt((quoted_cell, bare_cell))).parse(input)
}

/// Tokenize one CSV-like line into cells
///
/// Quotes only ever wrap a whole cell. A line that does not follow that
/// shape is kept whole as a single bare cell.
pub fn parse_row(line: &str) -> Vec<Cell> {
    match all_consuming(cells).parse(line) {
        Ok((_, parsed)) => parsed,
        Err(_) => vec![Cell::bare(line)],
    }
}

/// Whether a line is the 4-digit-indexed member of a row series;
/// returns the series prefix and the row index
pub fn series_key(key: &str) -> Option<(&str, usize)> {
    if key.len() < 5 || !key.is_char_boundary(key.len() - 4) {
        return None;
    }
    let (head, digits) = key.split_at(key.len() - 4);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse().ok()?;
    let prefix = head.strip_suffix('_').unwrap_or(head);
    if prefix.is_empty() {
        return None;
    }
    Some((prefix, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name() {
        assert_eq!(tag_name("[player0]"), Some("player0"));
        assert_eq!(tag_name("[]"), Some(""));
        assert_eq!(tag_name("[broken"), None);
    }

    #[test]
    fn test_field_header() {
        assert_eq!(field_header("t0000=\"aa\""), Some(("t0000", "\"aa\"")));
        assert_eq!(field_header("ai.level=3"), Some(("ai.level", "3")));
        assert_eq!(field_header("; comment = x"), None);
        assert_eq!(field_header("=x"), None);
    }

    #[test]
    fn test_parse_row_mixed_cells() {
        let cells = parse_row("\"Workers\",12,FALSE,\"Great Library\"");
        assert_eq!(
            cells,
            vec![
                Cell::quoted("Workers"),
                Cell::bare("12"),
                Cell::bare("FALSE"),
                Cell::quoted("Great Library"),
            ]
        );
    }

    #[test]
    fn test_parse_row_keeps_commas_inside_quotes() {
        let cells = parse_row("\"a,b\",-,");
        assert_eq!(cells, vec![Cell::quoted("a,b"), Cell::bare("-"), Cell::bare("")]);
    }

    #[test]
    fn test_parse_row_falls_back_on_stray_quote() {
        let cells = parse_row("ab\"c");
        assert_eq!(cells, vec![Cell::bare("ab\"c")]);
    }

    #[test]
    fn test_series_key() {
        assert_eq!(series_key("t0003"), Some(("t", 3)));
        assert_eq!(series_key("e01_0012"), Some(("e01", 12)));
        assert_eq!(series_key("map_e00_0000"), Some(("map_e00", 0)));
        assert_eq!(series_key("k00_0001"), Some(("k00", 1)));
        assert_eq!(series_key("owner0010"), Some(("owner", 10)));
        assert_eq!(series_key("turn"), None);
        assert_eq!(series_key("0001"), None);
    }
}
