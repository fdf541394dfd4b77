//! A1-notation helpers.
//!
//! Columns are zero-based indices everywhere in taskgrid; rows passed to
//! these helpers are the 1-based row numbers the Sheets UI shows.

/// Range covering every column when no tab name is known.
const ALL_COLUMNS: &str = "A:ZZZ";

/// Spreadsheet-style column letters: 0 → "A", 25 → "Z", 26 → "AA".
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Inverse of [`column_letter`]. Returns `None` for anything that is not a
/// non-empty run of ASCII letters.
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

/// Quote a tab name for use in a range: `It's` → `'It''s'`.
pub fn quote_tab(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// The header row of a tab.
pub fn header_range(tab: Option<&str>) -> String {
    match tab {
        Some(name) => format!("{}!1:1", quote_tab(name)),
        None => "1:1".to_string(),
    }
}

/// Every populated cell of a tab.
pub fn sheet_range(tab: Option<&str>) -> String {
    match tab {
        Some(name) => quote_tab(name),
        None => ALL_COLUMNS.to_string(),
    }
}

/// A single cell, e.g. `'Tasks'!C3`.
pub fn cell_range(tab: Option<&str>, column: usize, row_number: usize) -> String {
    let cell = format!("{}{}", column_letter(column), row_number);
    match tab {
        Some(name) => format!("{}!{cell}", quote_tab(name)),
        None => cell,
    }
}

/// A parsed single-cell range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub tab: Option<String>,
    /// Zero-based column index.
    pub column: usize,
    /// 1-based row number.
    pub row_number: usize,
}

/// Parse a single-cell range produced by [`cell_range`].
pub fn parse_cell_range(range: &str) -> Option<CellRef> {
    let (tab, cell) = match range.rfind('!') {
        Some(pos) => (Some(unquote_tab(&range[..pos])), &range[pos + 1..]),
        None => (None, range),
    };

    let split = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(split);
    let column = column_index(letters)?;
    let row_number: usize = digits.parse().ok()?;
    if row_number == 0 {
        return None;
    }

    Some(CellRef {
        tab,
        column,
        row_number,
    })
}

fn unquote_tab(raw: &str) -> String {
    raw.strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .map(|s| s.replace("''", "'"))
        .unwrap_or_else(|| raw.to_string())
}
