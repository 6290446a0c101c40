use crate::domain::document::{Document, DocumentKind};

/// Minimum width of the zero-padded numeric suffix.
pub const SUFFIX_WIDTH: usize = 4;

/// Numeric suffix of `number` under `prefix`, if it has one.
///
/// Both `6200007` and `620-0007` yield `7`.
pub fn parse_suffix(number: &str, prefix: &str) -> Option<u32> {
    let rest = number.trim().strip_prefix(prefix)?;
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

pub fn format_number(kind: DocumentKind, suffix: u32) -> String {
    format!("{}-{:0width$}", kind.prefix(), suffix, width = SUFFIX_WIDTH)
}

/// Next free number for `kind`: one past the highest suffix among `existing`
/// documents of that kind, or `1` when there are none.
///
/// Only the documents passed in are considered; two callers working from the
/// same snapshot get the same number.
pub fn next_document_number(kind: DocumentKind, existing: &[Document]) -> String {
    let prefix = kind.prefix();
    let highest = existing
        .iter()
        .filter(|document| document.kind == kind)
        .filter_map(|document| parse_suffix(&document.number, prefix))
        .max()
        .unwrap_or(0);

    format_number(kind, highest.saturating_add(1))
}
