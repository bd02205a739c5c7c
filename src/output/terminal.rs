//! Plain-terminal rendering of a page: an aligned table or a two-column
//! card grid. Color comes from `colored` and is switched off globally with
//! `colored::control::set_override(false)`.

use colored::Colorize;
use itertools::Itertools;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{Listing, ViewMode, TABLE_COLUMNS};
use crate::paginate::Page;
use crate::store::{Attribute, Record, SENTINEL};

pub const DEFAULT_MAX_WIDTH: usize = 40;
pub const CARD_WIDTH: usize = 48;
const GUTTER: &str = "  ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Plain,
    Header,
    Link,
    Missing,
}

struct Line {
    painted: String,
    width: usize,
}

fn paint(text: &str, style: Style) -> String {
    match style {
        Style::Plain => text.to_string(),
        Style::Header => text.bold().to_string(),
        Style::Link => text.blue().underline().to_string(),
        Style::Missing => text.dimmed().to_string(),
    }
}

fn value_style(record: &Record, attr: Attribute) -> Style {
    match record.get(attr) {
        None => Style::Missing,
        Some(_) if attr == Attribute::Website && record.website_link().is_some() => Style::Link,
        Some(_) => Style::Plain,
    }
}

/// Truncates to `width` display columns, ending in an ellipsis when cut.
pub fn fit(value: &str, width: usize) -> String {
    let value: String = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if value.width() <= width {
        return value;
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in value.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn padding(used: usize, width: usize) -> String {
    " ".repeat(width.saturating_sub(used))
}

fn column_title(attr: Attribute) -> &'static str {
    match attr {
        Attribute::Website => "Website",
        other => other.label(),
    }
}

pub fn render_table(records: &[&Record], columns: &[Attribute], max_width: usize) -> String {
    let header: Vec<String> = columns
        .iter()
        .map(|c| fit(column_title(*c), max_width))
        .collect();
    let rows: Vec<Vec<(String, Style)>> = records
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| (fit(r.display(*c), max_width), value_style(r, *c)))
                .collect()
        })
        .collect();
    let widths: Vec<usize> = (0..columns.len())
        .map(|i| {
            rows.iter()
                .map(|row| row[i].0.width())
                .chain(std::iter::once(header[i].width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let last = columns.len().saturating_sub(1);
    let mut out = String::new();
    let head = header
        .iter()
        .enumerate()
        .map(|(i, h)| cell(h, Style::Header, widths[i], i == last))
        .join(GUTTER);
    out.push_str(&head);
    out.push('\n');
    out.push_str(&widths.iter().map(|w| "-".repeat(*w)).join(GUTTER));
    out.push('\n');
    for row in rows.iter() {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, (text, style))| cell(text, *style, widths[i], i == last))
            .join(GUTTER);
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn cell(text: &str, style: Style, width: usize, last: bool) -> String {
    if last {
        paint(text, style)
    } else {
        format!("{}{}", paint(text, style), padding(text.width(), width))
    }
}

fn labeled(label: &str, record: &Record, attr: Attribute, width: usize) -> Line {
    let prefix = format!("{label}: ");
    let value = fit(record.display(attr), width.saturating_sub(prefix.width()));
    Line {
        width: prefix.width() + value.width(),
        painted: format!("{prefix}{}", paint(&value, value_style(record, attr))),
    }
}

fn card_lines(record: &Record, width: usize) -> Vec<Line> {
    let name = fit(record.display(Attribute::Name), width);
    vec![
        Line {
            width: name.width(),
            painted: paint(&name, Style::Header),
        },
        labeled("Category", record, Attribute::Category, width),
        labeled("Country", record, Attribute::Country, width),
        labeled("Description", record, Attribute::ShortDescription, width),
        labeled("Website", record, Attribute::Website, width),
        labeled("Email", record, Attribute::Email, width),
        labeled("Phone", record, Attribute::Phone, width),
    ]
}

/// Two cards per row, each row followed by a rule.
pub fn render_cards(records: &[&Record], card_width: usize) -> String {
    let cards: Vec<Vec<Line>> = records.iter().map(|r| card_lines(r, card_width)).collect();
    let rule = "─".repeat(card_width * 2 + GUTTER.len());
    let mut out = String::new();
    for pair in cards.chunks(2) {
        let height = pair.iter().map(Vec::len).max().unwrap_or(0);
        for i in 0..height {
            let left = pair[0].get(i);
            let right = pair.get(1).and_then(|card| card.get(i));
            let mut line = String::new();
            if let Some(l) = left {
                line.push_str(&l.painted);
            }
            if let Some(r) = right {
                let used = left.map_or(0, |l| l.width);
                line.push_str(&padding(used, card_width));
                line.push_str(GUTTER);
                line.push_str(&r.painted);
            }
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&rule);
        out.push('\n');
    }
    out
}

pub fn summary_line(total: usize) -> String {
    format!("Displaying {total} Organisations").bold().to_string()
}

pub fn footer_line<T>(page: &Page<'_, T>) -> String {
    format!(
        "Page {} of {} ({})",
        page.page_number(),
        page.total_pages(),
        page.range_label()
    )
}

pub fn empty_state() -> String {
    "No organisations match your current filters."
        .yellow()
        .to_string()
}

/// Summary, the current page in the chosen view, and the page footer.
pub fn render_listing(listing: &Listing<'_>, max_width: usize) -> String {
    let mut out = String::new();
    out.push_str(&summary_line(listing.view.len()));
    out.push_str("\n\n");
    if listing.page.is_empty() {
        out.push_str(&empty_state());
        out.push('\n');
        return out;
    }
    match listing.mode {
        ViewMode::Table => out.push_str(&render_table(
            listing.page.items(),
            &TABLE_COLUMNS,
            max_width,
        )),
        ViewMode::Cards => out.push_str(&render_cards(listing.page.items(), CARD_WIDTH)),
    }
    out.push('\n');
    out.push_str(&footer_line(&listing.page));
    out.push('\n');
    out
}

/// Every attribute of every filtered record, unpaginated.
pub fn render_raw(records: &[&Record], max_width: usize) -> String {
    render_table(records, &Attribute::ALL, max_width)
}

pub fn render_facets(title: &str, values: &[String]) -> String {
    let mut out = format!("{}\n", title.bold());
    for v in values {
        let line = if v == SENTINEL {
            paint(v, Style::Missing)
        } else {
            v.clone()
        };
        out.push_str("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterEngine, FilterQuery, DEFAULT_SEARCH_FIELDS};
    use crate::paginate::Paginator;
    use crate::store::Dataset;

    fn plain() {
        colored::control::set_override(false);
    }

    fn org(name: &str, website: Option<&str>) -> Record {
        Record {
            name: Some(name.to_string()),
            category: Some("Health".to_string()),
            country: Some("UK".to_string()),
            website: website.map(str::to_string),
            ..Record::default()
        }
    }

    #[test]
    fn fit_truncates_by_display_width() {
        assert_eq!(fit("WaterAid", 20), "WaterAid");
        assert_eq!(fit("WaterAid", 6), "Water…");
        assert_eq!(fit("line\nbreak", 20), "line break");
        assert_eq!(fit("慈善团体", 5), "慈善…");
        assert_eq!(fit("anything", 0), "");
    }

    #[test]
    fn table_aligns_columns_and_fills_sentinels() {
        plain();
        let a = org("WaterAid", Some("https://wateraid.org"));
        let b = org("Oxfam", None);
        let out = render_table(&[&a, &b], &[Attribute::Name, Attribute::Website], 40);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Organisation Name  Website");
        assert_eq!(lines[1], "-----------------  --------------------");
        assert_eq!(lines[2], "WaterAid           https://wateraid.org");
        assert_eq!(lines[3], "Oxfam              N/A");
    }

    #[test]
    fn cards_pair_up_with_rules() {
        plain();
        let records = [org("A", None), org("B", None), org("C", None)];
        let refs: Vec<&Record> = records.iter().collect();
        let out = render_cards(&refs, 20);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], format!("A{}  B", " ".repeat(19)));
        assert_eq!(lines[1], format!("Category: Health{}  Category: Health", " ".repeat(4)));
        assert!(lines[7].starts_with('─'));
        assert_eq!(lines[8], "C");
        assert_eq!(lines.len(), 16);
    }

    #[test]
    fn listing_shows_empty_state() {
        plain();
        let ds = Dataset::new(vec![org("WaterAid", None)]);
        let query = FilterQuery::new().with_term("no such charity");
        let view = FilterEngine::default().apply(&ds, &query);
        let page = Paginator::default().paginate(view.as_slice(), 1).unwrap();
        let listing = Listing {
            query: &query,
            view: &view,
            page,
            mode: ViewMode::Cards,
            search_fields: &DEFAULT_SEARCH_FIELDS,
        };
        let out = render_listing(&listing, DEFAULT_MAX_WIDTH);
        assert!(out.starts_with("Displaying 0 Organisations"));
        assert!(out.contains("No organisations match your current filters."));
    }

    #[test]
    fn listing_footer_reports_range() {
        plain();
        let records: Vec<Record> = (0..25).map(|i| org(&format!("Org {i}"), None)).collect();
        let ds = Dataset::new(records);
        let query = FilterQuery::new();
        let view = FilterEngine::default().apply(&ds, &query);
        let page = Paginator::default().paginate(view.as_slice(), 3).unwrap();
        let listing = Listing {
            query: &query,
            view: &view,
            page,
            mode: ViewMode::Table,
            search_fields: &DEFAULT_SEARCH_FIELDS,
        };
        let out = render_listing(&listing, DEFAULT_MAX_WIDTH);
        assert!(out.contains("Org 24"));
        assert!(!out.contains("Org 19"));
        assert!(out.trim_end().ends_with("Page 3 of 3 (Showing 21-25 of 25)"));
    }
}
