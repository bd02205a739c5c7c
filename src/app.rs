use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation::{self, MIN_COLUMN_WIDTH};
use crate::config::{self, ConfigError, ConfigFile};
use crate::filter::{FilterEngine, FilterQuery, DEFAULT_SEARCH_FIELDS};
use crate::output::{self, terminal, OutputError, OutputFormat, ViewMode};
use crate::paginate::{Paginator, DEFAULT_PAGE_SIZE};
use crate::session::{CommandError, Facet, Reply, Session, SessionCommand};
use crate::store::cache::DatasetCache;
use crate::store::{Attribute, Dataset, LoadOptions};

pub const DEFAULT_DATA_FILE: &str = "charities.csv";
const PROMPT: &str = "charitydir> ";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("failed to write output file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug)]
struct RunConfig {
    data_path: PathBuf,
    load_options: LoadOptions,
    query: FilterQuery,
    search_fields: Vec<Attribute>,
    page: usize,
    page_size: usize,
    view: ViewMode,
    max_width: usize,
    raw: bool,
    list: Option<Facet>,
    interactive: bool,
    output: Option<String>,
    output_format: Option<OutputFormat>,
    no_color: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let data_path = config::expand_tilde(
        args.data
            .or(cfg.data_file)
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string())
            .as_str(),
    );

    let delimiter = match args.delimiter.or(cfg.delimiter) {
        Some(raw) => crate::utils::parse_delimiter(&raw)
            .map_err(|e| format!("invalid delimiter: {e}"))?,
        None => b',',
    };
    let keep_na_tokens = args.keep_na_tokens || cfg.keep_na_tokens.unwrap_or(false);
    let load_options = LoadOptions {
        delimiter,
        na_tokens: !keep_na_tokens,
    };

    let search_fields = match args
        .search_fields
        .or_else(|| cfg.search_fields.map(|fields| fields.join(",")))
    {
        Some(raw) => crate::utils::parse_attribute_list(&raw)
            .map_err(|e| format!("invalid search fields '{raw}': {e}"))?,
        None => DEFAULT_SEARCH_FIELDS.to_vec(),
    };

    let query = FilterQuery::new()
        .with_term(args.search.unwrap_or_default())
        .with_categories(crate::utils::collect_selection(&args.category))
        .with_countries(crate::utils::collect_selection(&args.country));

    let page = args.page.unwrap_or(1);
    let page_size = args.page_size.or(cfg.page_size).unwrap_or(DEFAULT_PAGE_SIZE);

    let view_raw = args.view.or(cfg.view).unwrap_or_else(|| "table".to_string());
    let view = ViewMode::parse(&view_raw)
        .ok_or_else(|| format!("invalid view '{view_raw}', expected table or cards"))?;

    let max_width = args
        .max_width
        .or(cfg.max_width)
        .unwrap_or(terminal::DEFAULT_MAX_WIDTH);
    if max_width < MIN_COLUMN_WIDTH {
        return Err(format!(
            "invalid max-width {max_width}, expected at least {MIN_COLUMN_WIDTH}"
        ));
    }

    let list = args.list.as_deref().and_then(Facet::parse);

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => Some(OutputFormat::parse(&raw).ok_or_else(|| {
            format!("invalid output format '{raw}', expected text, json, csv or html")
        })?),
        None => None,
    };

    Ok(RunConfig {
        data_path,
        load_options,
        query,
        search_fields,
        page,
        page_size,
        view,
        max_width,
        raw: args.raw,
        list,
        interactive: args.interactive,
        output,
        output_format,
        no_color,
    })
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded or under test.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn notice(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

fn load_or_empty(cache: &mut DatasetCache, run: &RunConfig) -> Arc<Dataset> {
    match cache.get_or_load(&run.data_path, &run.load_options) {
        Ok(dataset) => dataset,
        Err(err) => {
            warn!(%err, "continuing with an empty directory");
            notice(&format!("Could not load charity data: {err}"));
            Arc::new(Dataset::empty())
        }
    }
}

fn paginator_for(page_size: usize) -> Paginator {
    Paginator::new(page_size).unwrap_or_else(|err| {
        warn!(%err, "using the default page size");
        notice(&format!("{err}; using {DEFAULT_PAGE_SIZE} per page"));
        Paginator::default()
    })
}

/// Validates the requested start page against the filtered view.
fn starting_page(session: &Session, requested: usize) -> usize {
    let view = session.filtered();
    match session.paginator().paginate(view.as_slice(), requested) {
        Ok(_) => requested,
        Err(err) => {
            warn!(%err, "showing page 1 instead");
            notice(&format!("{err}; showing page 1"));
            1
        }
    }
}

fn write_output(run: &RunConfig, session: &Session, path: &str) -> Result<(), AppError> {
    let format = run
        .output_format
        .or_else(|| output::infer_format_from_path(path))
        .unwrap_or(OutputFormat::Text);
    let dataset = Arc::clone(session.dataset());
    let rendered =
        session.with_listing(|listing, _| output::render(format, listing, dataset.records()))?;
    std::fs::write(path, rendered).map_err(|source| AppError::Write {
        path: path.to_string(),
        source,
    })?;
    info!(path, ?format, "wrote listing");
    Ok(())
}

fn run_once<W: Write>(run: &RunConfig, session: &Session, out: &mut W) -> Result<(), AppError> {
    if let Some(facet) = run.list {
        write!(
            out,
            "{}",
            terminal::render_facets(facet.title(), &session.facet_values(facet))
        )?;
        return Ok(());
    }

    if run.raw {
        let view = session.filtered();
        writeln!(out, "{}\n", terminal::summary_line(view.len()))?;
        if view.is_empty() {
            writeln!(out, "{}", terminal::empty_state())?;
        } else {
            write!(out, "{}", terminal::render_raw(view.as_slice(), run.max_width))?;
        }
    } else {
        write!(out, "{}", session.render(run.max_width))?;
    }

    if let Some(path) = run.output.as_deref() {
        write_output(run, session, path)?;
    }
    Ok(())
}

/// Picks up an edited data file between commands; a failed reload keeps the
/// directory already on screen.
fn refresh(session: &mut Session, cache: &mut DatasetCache, run: &RunConfig) {
    match cache.get_or_load(&run.data_path, &run.load_options) {
        Ok(dataset) if !Arc::ptr_eq(&dataset, session.dataset()) => {
            info!(path = %run.data_path.display(), "data file changed, reloaded");
            session.replace_dataset(dataset);
        }
        Ok(_) => {}
        Err(err) => debug!(%err, "keeping the loaded directory"),
    }
}

fn run_interactive<R: BufRead, W: Write>(
    run: &RunConfig,
    session: &mut Session,
    cache: &mut DatasetCache,
    input: R,
    out: &mut W,
) -> Result<(), AppError> {
    write!(out, "{}", session.render(run.max_width))?;
    writeln!(out, "Type 'help' for commands.")?;

    let mut lines = input.lines();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;

        let command = match SessionCommand::parse(&line) {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(err) => {
                writeln!(out, "{} {err}", "error:".red().bold())?;
                continue;
            }
        };
        debug!(?command, "session command");

        match session.execute(command) {
            Reply::Render => {
                refresh(session, cache, run);
                write!(out, "{}", session.render(run.max_width))?;
            }
            Reply::Text(text) => write!(out, "{text}")?,
            Reply::Reload => {
                cache.invalidate(&run.data_path);
                let dataset = load_or_empty(cache, run);
                session.replace_dataset(dataset);
                writeln!(out, "Reloaded {} organisations.", session.dataset().len())?;
                write!(out, "{}", session.render(run.max_width))?;
            }
            Reply::Quit => break,
        }
    }
    Ok(())
}

fn run_with<R: BufRead, W: Write>(run: &RunConfig, input: R, out: &mut W) -> Result<(), AppError> {
    let mut cache = DatasetCache::new();
    let dataset = load_or_empty(&mut cache, run);
    let engine = FilterEngine::new(run.search_fields.clone());
    let mut session = Session::new(dataset, engine, paginator_for(run.page_size))
        .with_query(run.query.clone())
        .with_view(run.view);
    let page = starting_page(&session, run.page);
    session.set_page(page);

    if run.interactive {
        run_interactive(run, &mut session, &mut cache, input, out)
    } else {
        run_once(run, &session, out)
    }
}

fn init_config(path: Option<&str>) -> Result<(), AppError> {
    let path = match path {
        Some(p) => config::expand_tilde(p),
        None => config::default_config_path()
            .ok_or_else(|| AppError::Usage("could not determine the home directory".to_string()))?,
    };
    if config::ensure_default_config_file(&path)? {
        println!("Wrote default config to {}", path.display());
    } else {
        println!("Config already exists at {}", path.display());
    }
    Ok(())
}

pub fn run_cli() -> Result<(), AppError> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                e.print()?;
                return Ok(());
            }
            _ => return Err(AppError::Usage(e.to_string())),
        },
    };

    init_tracing(args.verbose);

    if args.init_config {
        return init_config(args.config.as_deref());
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg).map_err(AppError::Usage)?;
    if run.no_color {
        colored::control::set_override(false);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with(&run, stdin.lock(), &mut out)?;
    out.flush()?;
    Ok(())
}
