use crate::cli::args::CliArgs;
use crate::output::{OutputFormat, ViewMode};
use crate::session::Facet;

pub const MIN_COLUMN_WIDTH: usize = 4;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.view.as_deref() {
        if ViewMode::parse(raw).is_none() {
            return Err(format!("invalid --view '{raw}', expected table or cards"));
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --format '{raw}', expected text, json, csv or html"
            ));
        }
    }
    if let Some(raw) = args.list.as_deref() {
        if Facet::parse(raw).is_none() {
            return Err(format!("invalid --list '{raw}', expected categories or countries"));
        }
    }
    if let Some(raw) = args.search_fields.as_deref() {
        crate::utils::parse_attribute_list(raw)
            .map_err(|e| format!("invalid --search-fields '{raw}': {e}"))?;
    }
    if let Some(raw) = args.delimiter.as_deref() {
        crate::utils::parse_delimiter(raw).map_err(|e| format!("invalid --delimiter: {e}"))?;
    }
    if let Some(width) = args.max_width {
        if width < MIN_COLUMN_WIDTH {
            return Err(format!(
                "invalid --max-width {width}, expected at least {MIN_COLUMN_WIDTH}"
            ));
        }
    }
    if args.interactive && (args.raw || args.list.is_some()) {
        return Err("--interactive cannot be combined with --raw or --list".to_string());
    }
    Ok(())
}
