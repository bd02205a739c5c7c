use std::collections::BTreeSet;

use crate::store::Attribute;

/// Splits comma-separated values, trimming and dropping empties.
pub fn parse_list_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Flattens repeated flag values, each of which may itself be a CSV list.
pub fn collect_selection(values: &[String]) -> BTreeSet<String> {
    values.iter().flat_map(|v| parse_list_csv(v)).collect()
}

pub fn parse_attribute_list(value: &str) -> Result<Vec<Attribute>, String> {
    let mut out = Vec::new();
    for item in parse_list_csv(value) {
        let attr = Attribute::parse(&item).ok_or_else(|| format!("unknown attribute '{item}'"))?;
        if !out.contains(&attr) {
            out.push(attr);
        }
    }
    if out.is_empty() {
        return Err("expected at least one attribute".to_string());
    }
    Ok(out)
}

/// Accepts a single ASCII character, or `tab`/`\t`.
pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => return Ok(b'\t'),
        _ => {}
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => Ok(c as u8),
        _ => Err(format!("invalid delimiter '{value}', expected a single ASCII character")),
    }
}
