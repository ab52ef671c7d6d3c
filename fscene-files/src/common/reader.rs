use std::str::FromStr;

use crate::ParserError;

/// Index lists (bounds, materials, textures, ...) are packed into one column as `12\34\56`.
pub const SUB_ARRAY_SEPARATOR: char = '\\';

/// Splits one data line into its fields.
///
/// Fields are separated by `,`. A field enclosed in `"` is taken literally (commas included) and
/// without the quotes; the comma that follows the closing quote does not produce an empty field.
/// Sub-arrays such as `12\34\56` are kept as one token, see [`parse_array`].
pub fn tokenize_row(line: &str) -> Vec<String> {
    if line.is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                // "" inside a quoted field is a literal quote
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    current.push('"');
                }
                '"' => in_quotes = false,
                _ => current.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                // Anything between the previous delimiter and the opening quote is dropped.
                current.clear();
                in_quotes = true;
            }
            ',' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    // the last field has no trailing delimiter
    fields.push(current);
    fields
}

pub fn parse_numeric<T: FromStr>(token: &str) -> Result<T, ParserError> {
    token
        .trim()
        .parse::<T>()
        .map_err(|_| ParserError::NumericConversion {
            token: token.to_owned(),
            target: std::any::type_name::<T>(),
        })
}

/// Non-zero integers are `true`. The export writes booleans as `0`/`1`.
pub fn parse_flag(token: &str) -> Result<bool, ParserError> {
    Ok(parse_numeric::<u16>(token)? != 0)
}

/// Splits `token` on `separator` and converts every element. Empty elements are skipped, so an
/// empty token is an empty list.
pub fn parse_array<T: FromStr>(token: &str, separator: char) -> Result<Vec<T>, ParserError> {
    token
        .split(separator)
        .filter(|element| !element.trim().is_empty())
        .map(parse_numeric::<T>)
        .collect()
}

/// Some single indices are exported in sub-array form, only the first element is meaningful.
pub fn parse_array_first<T: FromStr>(token: &str, separator: char) -> Result<T, ParserError> {
    parse_array::<T>(token, separator)?
        .into_iter()
        .next()
        .ok_or_else(|| ParserError::EmptyArray {
            token: token.to_owned(),
        })
}

/// Returns the text strictly between the first occurrence of `left` and the next occurrence of
/// `right` after it.
pub fn find_between<'a>(text: &'a str, left: &str, right: &str) -> Option<&'a str> {
    let start = text.find(left)? + left.len();
    let end = text[start..].find(right)? + start;
    Some(&text[start..end])
}

pub fn extract_between<T: FromStr>(text: &str, left: &str, right: &str) -> Result<T, ParserError> {
    let between = find_between(text, left, right).ok_or_else(|| ParserError::DelimiterNotFound {
        left: left.to_owned(),
        right: right.to_owned(),
    })?;
    parse_numeric(between)
}

/// Positional access to a tokenized row. Column 0 is the row id of the export and never read by
/// record schemas.
pub struct RowReader<'a> {
    row: &'a [String],
}

impl<'a> RowReader<'a> {
    pub fn new(row: &'a [String]) -> Self {
        Self { row }
    }

    pub fn try_read_field(&self, index: usize) -> Option<&'a str> {
        self.row.get(index).map(String::as_str)
    }
}
