//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use tabula::SortState;

#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(about = "Filter, sort and lay out table rows from a JSON file")]
#[command(version)]
pub struct Args {
    /// JSON file holding an array of row objects
    pub input: PathBuf,

    /// Filter rows by text
    #[arg(short, long)]
    pub query: Option<String>,

    /// Sort by a column, optionally suffixed with `:desc`
    #[arg(short, long, value_parser = parse_sort)]
    pub sort: Option<SortState>,

    /// Fields searched by --query (default: all filterable columns)
    #[arg(short, long, value_delimiter = ',')]
    pub fields: Option<Vec<String>>,

    /// Fuzzy instead of substring matching
    #[arg(long)]
    pub fuzzy: bool,

    /// Row key field
    #[arg(short, long, default_value = "id")]
    pub key: String,

    /// Select every visible row
    #[arg(long)]
    pub select_all: bool,

    /// Page to show (1-based)
    #[arg(long, default_value_t = 1, value_parser = parse_count)]
    pub page: usize,

    /// Rows per page
    #[arg(long, value_parser = parse_count)]
    pub page_size: Option<usize>,

    /// Table config JSON (default: platform config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log file (default: platform cache dir)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Print visible rows as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_sort(spec: &str) -> Result<SortState, String> {
    let state = match spec.rsplit_once(':') {
        Some((column, "desc")) => SortState::desc(column.trim()),
        Some((column, "asc")) => SortState::asc(column.trim()),
        _ => SortState::asc(spec.trim()),
    };
    match state.column.as_deref() {
        Some("") => Err("sort column must not be empty".to_string()),
        _ => Ok(state),
    }
}

fn parse_count(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a positive number, got {}", raw)),
    }
}
