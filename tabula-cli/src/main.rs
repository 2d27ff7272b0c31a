mod args;
mod error;
mod paths;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use serde::Serialize;
use simplelog::{Config, LevelFilter, WriteLogger};
use tabula::prelude::*;
use tabula::{Pagination, TableSnapshot, VisibleRow};

use crate::args::Args;
use crate::error::CliError;

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    init_logging(args.log.clone())?;

    let mut config = load_config(args.config.as_deref())?;
    if args.select_all {
        config.selection_mode = SelectionMode::Multiple;
    }
    if args.fuzzy {
        config.filter_mode = FilterMode::Fuzzy;
    }

    let rows = read_rows(&args.input)?;
    log::info!("Loaded {} rows from {}", rows.len(), args.input.display());

    let key_spec = KeySpec::field(args.key.as_str());
    let table = match rows.first() {
        Some(sample) => Table::inferred(sample, key_spec),
        None => Table::new(Vec::new(), key_spec),
    };
    let mut options = FilterOptions::new().with_mode(config.filter_mode);
    if let Some(fields) = &args.fields {
        options = options.with_fields(fields.iter().cloned());
    }
    let mut table = table.with_config(config).with_filter_options(options);

    if let Some(query) = &args.query {
        table.set_query(query.as_str(), Instant::now());
        if let Some(deadline) = table.filter().deadline() {
            table.tick(deadline);
        }
    }
    if let Some(sort) = args.sort.clone() {
        table.set_sort(sort);
    }
    if args.select_all {
        table.on_select_all(&rows, true)?;
    }

    let snapshot = table.snapshot(&rows)?;
    let page = match args.page_size {
        Some(size) => {
            let mut pagination = Pagination::new(size, snapshot.rows.len())?;
            pagination.go_to(args.page);
            log::debug!("{:?}", pagination);
            pagination.page_bounds()
        }
        None => 0..snapshot.rows.len(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        print_json(&mut out, &snapshot.rows[page])?;
    } else {
        print_grid(&mut out, &table, &snapshot, page).map_err(|source| CliError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        })?;
    }
    Ok(())
}

fn init_logging(explicit: Option<PathBuf>) -> Result<(), CliError> {
    let Some(path) = explicit.or_else(paths::log_file) else {
        return Ok(());
    };
    let file = File::create(&path).map_err(|source| CliError::Io { path, source })?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), file)?;
    Ok(())
}

/// Load the table config from `explicit`, or the default location when it
/// exists. Falls back to the built-in defaults.
fn load_config(explicit: Option<&Path>) -> Result<TableConfig, CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match paths::config_file() {
            Some(path) if path.exists() => path,
            _ => {
                log::debug!("No config file, using defaults");
                return Ok(TableConfig::default());
            }
        },
    };
    let raw = fs::read_to_string(&path).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;
    let config = serde_json::from_str(&raw).map_err(|source| CliError::Json {
        path: path.clone(),
        source,
    })?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

fn read_rows(path: &Path) -> Result<Vec<Row>, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Serialize)]
struct OutputRow<'a> {
    key: &'a RowKey,
    selected: bool,
    row: &'a Row,
}

fn print_json(out: &mut impl Write, rows: &[VisibleRow<'_, Row>]) -> Result<(), CliError> {
    let output: Vec<OutputRow<'_>> = rows
        .iter()
        .map(|r| OutputRow {
            key: &r.key,
            selected: r.selected,
            row: r.row,
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &output)?;
    let _ = writeln!(out);
    Ok(())
}

fn print_grid(
    out: &mut impl Write,
    table: &Table<Row>,
    snapshot: &TableSnapshot<'_, Row>,
    page: std::ops::Range<usize>,
) -> io::Result<()> {
    let widths = &table.config().widths;
    let selectable = table.selection().mode() != SelectionMode::None;
    let offset = snapshot.column_widths.len() - table.columns().len();
    let chars: Vec<usize> = snapshot.column_widths.tracks()[offset..]
        .iter()
        .map(|track| (track.min_px().saturating_sub(widths.cell_padding) / widths.char_width.max(1)).max(1) as usize)
        .collect();

    writeln!(out, "grid-template-columns: {}", snapshot.column_widths.template())?;

    let mut header = String::new();
    if selectable {
        header.push_str(if snapshot.is_all_selected {
            "[x] "
        } else if snapshot.is_indeterminate {
            "[-] "
        } else {
            "[ ] "
        });
    }
    for (column, width) in table.columns().iter().zip(&chars) {
        header.push_str(&format!("{:<width$} ", column.header, width = width));
    }
    writeln!(out, "{}", header.trim_end())?;

    for visible in &snapshot.rows[page.clone()] {
        let mut line = String::new();
        if selectable {
            line.push_str(if visible.selected { "[x] " } else { "[ ] " });
        }
        for (column, width) in table.columns().iter().zip(&chars) {
            line.push_str(&format!("{:<width$} ", column.text(visible.row), width = width));
        }
        writeln!(out, "{}", line.trim_end())?;
    }

    writeln!(
        out,
        "{} of {} rows shown{}",
        page.len(),
        snapshot.rows.len(),
        if snapshot.query.is_empty() {
            String::new()
        } else {
            format!(", filter '{}'", snapshot.query)
        }
    )
}
