//! Table observer for pretty-printing counter snapshots.
//!
//! This module provides [`TableObserver`], which renders a slice of
//! [`CountSnapshot`]s as a formatted table using the `tabled` crate.
//!
//! # Feature Flag
//!
//! This module requires the `table` feature:
//!
//! ```toml
//! [dependencies]
//! tracker-reader = { version = "0.1", features = ["table"] }
//! ```
//!
//! # Examples
//!
//! ## Standard format
//!
//! ```rust,ignore
//! use tracker_reader::observers::table::{TableObserver, TableStyle};
//!
//! let report = reader.report("signup", &[Granularity::Day, Granularity::Total], &filter)?;
//! let observer = TableObserver::new().with_style(TableStyle::Rounded);
//! println!("{}", observer.render(&report.counts));
//! // ╭────────┬─────────────┬──────────┬─────────┬───────╮
//! // │ Event  │ Granularity │ Date     │ Filter  │ Value │
//! // ├────────┼─────────────┼──────────┼─────────┼───────┤
//! // │ signup │ day         │ 20240115 │ env=all │ 31    │
//! // │ signup │ total       │          │ env=all │ 4096  │
//! // ╰────────┴─────────────┴──────────┴─────────┴───────╯
//! ```
//!
//! ## Compact format (multiple columns)
//!
//! ```rust,ignore
//! let observer = TableObserver::new().compact(true).columns(2);
//! println!("{}", observer.render(&report.counts));
//! // ╭───────────────────────────┬──────────────────────╮
//! // │ signup/day/20240115: 31   │ signup/total: 4096   │
//! // ╰───────────────────────────┴──────────────────────╯
//! ```

use crate::snapshot::CountSnapshot;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Available table styles for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// ASCII table with simple characters: +, -, |
    Ascii,
    /// Modern rounded corners (default)
    #[default]
    Rounded,
    /// Sharp corners with box-drawing characters
    Sharp,
    /// Modern style with clean lines
    Modern,
    /// GitHub-flavored Markdown table
    Markdown,
    /// Dots for borders
    Dots,
    /// No borders, just spacing
    Blank,
}

/// Separator between label and value in compact mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompactSeparator {
    /// "label: value"
    #[default]
    Colon,
    /// "label = value"
    Equals,
    /// "label → value"
    Arrow,
}

impl CompactSeparator {
    /// Returns the separator string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompactSeparator::Colon => ": ",
            CompactSeparator::Equals => " = ",
            CompactSeparator::Arrow => " → ",
        }
    }
}

/// Configuration for the table observer.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub style: TableStyle,
    /// Whether to show the header row (standard mode only).
    pub show_header: bool,
    pub title: Option<String>,
    /// Whether to render `label: value` cells in a grid.
    pub compact: bool,
    /// Number of columns in compact mode.
    pub columns: usize,
    pub separator: CompactSeparator,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            style: TableStyle::default(),
            show_header: true,
            title: None,
            compact: false,
            columns: 1,
            separator: CompactSeparator::default(),
        }
    }
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Granularity")]
    granularity: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Filter")]
    filter: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&CountSnapshot> for CountRow {
    fn from(snapshot: &CountSnapshot) -> Self {
        Self {
            event: snapshot.event_id.clone(),
            granularity: snapshot.granularity.to_string(),
            date: snapshot.date().unwrap_or_default().to_string(),
            filter: snapshot.filter.describe(),
            value: snapshot.value.to_string(),
        }
    }
}

/// An observer that renders counter snapshots as a formatted table.
///
/// Supports two rendering modes:
///
/// 1. **Standard mode**: one row per snapshot with Event, Granularity, Date,
///    Filter and Value columns
/// 2. **Compact mode**: a grid of `label: value` cells
#[derive(Debug, Clone, Default)]
pub struct TableObserver {
    config: TableConfig,
}

impl TableObserver {
    /// Creates a new table observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new table observer with the specified configuration.
    pub fn with_config(config: TableConfig) -> Self {
        Self { config }
    }

    /// Sets the table style.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.config.style = style;
        self
    }

    /// Sets whether to show the header row.
    pub fn with_header(mut self, show: bool) -> Self {
        self.config.show_header = show;
        self
    }

    /// Sets an optional title printed above the table.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    /// Enables or disables compact mode.
    pub fn compact(mut self, enabled: bool) -> Self {
        self.config.compact = enabled;
        self
    }

    /// Sets the number of columns in compact mode. Values below 1 are treated as 1.
    pub fn columns(mut self, count: usize) -> Self {
        self.config.columns = count.max(1);
        self
    }

    /// Sets the separator between label and value in compact mode.
    pub fn separator(mut self, sep: CompactSeparator) -> Self {
        self.config.separator = sep;
        self
    }

    fn apply_style(&self, table: &mut Table) {
        match self.config.style {
            TableStyle::Ascii => {
                table.with(Style::ascii());
            }
            TableStyle::Rounded => {
                table.with(Style::rounded());
            }
            TableStyle::Sharp => {
                table.with(Style::sharp());
            }
            TableStyle::Modern => {
                table.with(Style::modern());
            }
            TableStyle::Markdown => {
                table.with(Style::markdown());
            }
            TableStyle::Dots => {
                table.with(Style::dots());
            }
            TableStyle::Blank => {
                table.with(Style::blank());
            }
        }
    }

    fn with_title_line(&self, table: Table) -> String {
        match self.config.title {
            Some(ref title) => format!("{}\n{}", title, table),
            None => table.to_string(),
        }
    }

    fn render_compact(&self, snapshots: &[CountSnapshot]) -> String {
        if snapshots.is_empty() {
            return String::new();
        }

        let cells: Vec<String> = snapshots
            .iter()
            .map(|s| {
                let label = if s.unique {
                    format!("{} (unique)", s.label())
                } else {
                    s.label()
                };
                format!("{}{}{}", label, self.config.separator.as_str(), s.value)
            })
            .collect();

        let cols = self.config.columns;
        let mut builder = Builder::default();
        for chunk in cells.chunks(cols) {
            let mut row = chunk.to_vec();
            row.resize(cols, String::new());
            builder.push_record(row);
        }

        let mut table = builder.build();
        self.apply_style(&mut table);
        self.with_title_line(table)
    }

    fn render_standard(&self, snapshots: &[CountSnapshot]) -> String {
        let rows: Vec<CountRow> = snapshots.iter().map(CountRow::from).collect();

        let mut table = Table::new(&rows);
        self.apply_style(&mut table);

        if !self.config.show_header {
            table.with(tabled::settings::Remove::row(
                tabled::settings::object::Rows::first(),
            ));
        }

        self.with_title_line(table)
    }

    /// Renders the snapshots as a table string.
    ///
    /// In compact mode an empty slice renders as an empty string; in
    /// standard mode it renders the header only.
    pub fn render(&self, snapshots: &[CountSnapshot]) -> String {
        if self.config.compact {
            self.render_compact(snapshots)
        } else {
            self.render_standard(snapshots)
        }
    }
}
