use super::CsvLayout;

const DATE_HEADERS: &[&str] = &["date", "transaction date", "posted date", "occurred on"];
const NAME_HEADERS: &[&str] = &["name", "description", "payee", "memo"];
const AMOUNT_HEADERS: &[&str] = &["amount", "value", "sum"];
const CATEGORY_HEADERS: &[&str] = &["category", "type", "group"];

/// Map a header row onto a layout. Returns `None` unless at least the date
/// and amount columns can be found.
pub(crate) fn detect_layout(headers: &[String]) -> Option<CsvLayout> {
    let h: Vec<String> = headers
        .iter()
        .map(|s| s.to_lowercase().trim().to_string())
        .collect();

    let date_column = col_index(&h, DATE_HEADERS)?;
    let amount_column = col_index(&h, AMOUNT_HEADERS)?;
    Some(CsvLayout {
        date_column,
        name_column: col_index(&h, NAME_HEADERS),
        amount_column,
        category_column: col_index(&h, CATEGORY_HEADERS),
        has_header: true,
    })
}

fn col_index(headers: &[String], names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
