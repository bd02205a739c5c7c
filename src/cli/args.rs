use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "charitydir",
    version,
    about = "browse and filter a directory of charitable organisations",
    long_about = "charitydir loads a charity directory CSV and lets you search it, filter it by category and country, and page through the results as a table or as cards.\n\nExamples:\n  charitydir -d charities.csv\n  charitydir -s water --category Health,Education --view cards\n  charitydir --country Kenya -p 2 -o report.html\n  charitydir -i\n\nTip: Use --config to persist the data file and display settings."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv, -vvv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'd',
        long = "data",
        visible_alias = "input-file",
        value_name = "FILE",
        help_heading = "Input",
        help = "Charity directory CSV (defaults to ./charities.csv)."
    )]
    pub data: Option<String>,

    #[arg(
        long = "delimiter",
        value_name = "CHAR",
        help_heading = "Input",
        help = "Field delimiter of the data file (default ',')."
    )]
    pub delimiter: Option<String>,

    #[arg(
        long = "keep-na-tokens",
        help_heading = "Input",
        help = "Keep literal values such as 'N/A' or 'null' instead of treating them as missing."
    )]
    pub keep_na_tokens: bool,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.charitydir/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 's',
        long = "search",
        value_name = "TERM",
        help_heading = "Filters",
        help = "Search by name, description or category focus (case-insensitive)."
    )]
    pub search: Option<String>,

    #[arg(
        long = "category",
        value_name = "VALUES",
        action = ArgAction::Append,
        help_heading = "Filters",
        help = "Only show these categories (comma-separated, repeatable)."
    )]
    pub category: Vec<String>,

    #[arg(
        long = "country",
        value_name = "VALUES",
        action = ArgAction::Append,
        help_heading = "Filters",
        help = "Only show these countries (comma-separated, repeatable)."
    )]
    pub country: Vec<String>,

    #[arg(
        long = "search-fields",
        value_name = "ATTRS",
        help_heading = "Filters",
        help = "Attributes searched by --search (default: name,short_description,category_focus)."
    )]
    pub search_fields: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "Display",
        help = "Page number to show (1-based)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'n',
        long = "page-size",
        value_name = "N",
        help_heading = "Display",
        help = "Organisations per page (default 10)."
    )]
    pub page_size: Option<usize>,

    #[arg(
        long = "view",
        value_name = "MODE",
        help_heading = "Display",
        help = "Display mode: table or cards."
    )]
    pub view: Option<String>,

    #[arg(
        long = "max-width",
        value_name = "N",
        help_heading = "Display",
        help = "Maximum table column width in characters (default 40)."
    )]
    pub max_width: Option<usize>,

    #[arg(
        long = "raw",
        help_heading = "Display",
        help = "Show every attribute of every filtered organisation, unpaginated."
    )]
    pub raw: bool,

    #[arg(
        long = "list",
        value_name = "FACET",
        help_heading = "Display",
        help = "List the available categories or countries and exit."
    )]
    pub list: Option<String>,

    #[arg(
        short = 'i',
        long = "interactive",
        help_heading = "Display",
        help = "Browse interactively (type 'help' at the prompt)."
    )]
    pub interactive: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Also write the filtered listing to a file."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'F',
        long = "format",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output file format: text, json, csv or html (inferred from the extension otherwise)."
    )]
    pub output_format: Option<String>,
}
