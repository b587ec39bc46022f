use std::collections::BTreeMap;

use regex::Regex;

use crate::header::HeaderMap;

/// Placeholder that survives column resolution and is filled in when a
/// formula is applied to a concrete row.
pub const ROW_PLACEHOLDER: &str = "{row}";

/// Resolve every header-name token in the template vocabulary to its column
/// letter, leaving `{row}` placeholders intact.
///
/// Matching is whole-token: header names are assembled into one alternation
/// ordered longest-first and wrapped in word boundaries, so "Qtd" can never
/// match inside "Qtd Total" and a single pass never rewrites its own output.
pub fn resolve_columns(
    templates: &BTreeMap<String, String>,
    headers: &HeaderMap,
) -> BTreeMap<String, String> {
    let Some(pattern) = header_pattern(headers) else {
        return templates.clone();
    };

    templates
        .iter()
        .map(|(name, template)| {
            let resolved = pattern.replace_all(template, |caps: &regex::Captures| {
                let token = &caps[0];
                headers
                    .get(token)
                    .map(|col| col.letter.clone())
                    .unwrap_or_else(|| token.to_string())
            });
            (name.clone(), resolved.into_owned())
        })
        .collect()
}

/// Substitute the literal row number into a column-resolved formula.
///
/// ```
/// use budgetsheet_engine::template::apply_row;
///
/// assert_eq!(apply_row("=D{row}*E{row}", 12), "=D12*E12");
/// ```
pub fn apply_row(formula: &str, row: u32) -> String {
    formula.replace(ROW_PLACEHOLDER, &row.to_string())
}

fn header_pattern(headers: &HeaderMap) -> Option<Regex> {
    if headers.is_empty() {
        return None;
    }

    // longest alternative first so the regex engine prefers "Qtd Total"
    // over "Qtd" at the same position
    let mut names: Vec<&str> = headers.names().collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

    let alternation = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!(r"\b(?:{alternation})\b")).ok()
}
