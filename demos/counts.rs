//! Command-line reader for tracker counters stored in Redis.
//!
//! Run with:
//! ```bash
//! cargo run --example counts --features demo -- --app-id 42 --event signup --date 20240115
//! ```

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracker_reader::config::ReaderConfig;
use tracker_reader::filter::CountFilter;
use tracker_reader::granularity::Granularity;
use tracker_reader::keys::ALL_EVENTS;
use tracker_reader::observers::json::JsonObserver;
use tracker_reader::observers::table::{TableObserver, TableStyle};
use tracker_reader::store::redis::RedisStore;
use tracker_reader::CounterReader;

/// Output format for counter snapshots.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Pretty table, one row per counter
    Table,
    /// Compact grid of "label: value" cells
    Compact,
    /// JSON
    Json,
}

/// Table style selection.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum StyleChoice {
    Ascii,
    #[default]
    Rounded,
    Sharp,
    Modern,
    Markdown,
}

impl From<StyleChoice> for TableStyle {
    fn from(choice: StyleChoice) -> Self {
        match choice {
            StyleChoice::Ascii => TableStyle::Ascii,
            StyleChoice::Rounded => TableStyle::Rounded,
            StyleChoice::Sharp => TableStyle::Sharp,
            StyleChoice::Modern => TableStyle::Modern,
            StyleChoice::Markdown => TableStyle::Markdown,
        }
    }
}

/// Reads time-bucketed event counters of one application.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file (app_id, namespace, redis_url)
    #[arg(long)]
    config: Option<String>,

    /// Redis connection URL
    #[arg(long, default_value = "redis://127.0.0.1/")]
    url: String,

    /// Application id (overrides the config file)
    #[arg(long)]
    app_id: Option<String>,

    /// Key namespace (overrides the config file)
    #[arg(long)]
    namespace: Option<String>,

    /// Event id; omit for whole-app counters
    #[arg(short, long)]
    event: Option<String>,

    /// Granularities to read (repeatable); defaults to all
    #[arg(short, long)]
    granularity: Vec<Granularity>,

    /// Date bucket (YYYYMMDDHH, YYYYMMDD, YYYYWW, YYYYMM or YYYY)
    #[arg(short, long)]
    date: Option<String>,

    /// Restrict to one user id
    #[arg(long, conflicts_with = "unique")]
    user: Option<String>,

    /// Read unique-visitor counts
    #[arg(long)]
    unique: bool,

    /// Restrict to one object id
    #[arg(long)]
    oid: Option<String>,

    /// Restrict to one environment
    #[arg(long)]
    env: Option<String>,

    /// List captured events instead of reading counters
    #[arg(long)]
    list_events: bool,

    /// Show the object ids and environments recorded for --event
    #[arg(long, requires = "event")]
    dimensions: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Table style (for table/compact formats)
    #[arg(short, long, value_enum, default_value = "rounded")]
    style: StyleChoice,

    /// Number of columns (for compact format)
    #[arg(short, long, default_value = "3")]
    columns: usize,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,

    /// Include timestamp in JSON output
    #[arg(long)]
    timestamp: bool,
}

impl Args {
    fn reader_config(&self) -> tracker_reader::Result<ReaderConfig> {
        let mut config = match &self.config {
            Some(path) => ReaderConfig::from_file(path)?,
            None => ReaderConfig::new(self.app_id.clone().unwrap_or_default()),
        };
        if let Some(app_id) = &self.app_id {
            config.app_id = app_id.clone();
        }
        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if config.redis_url.is_none() {
            config.redis_url = Some(self.url.clone());
        }
        config.validate()?;
        Ok(config)
    }

    fn filter(&self) -> CountFilter {
        let mut filter = CountFilter::new();
        filter.date = self.date.clone();
        filter.user = self.user.clone();
        filter.oid = self.oid.clone();
        filter.env = self.env.clone();
        if self.unique {
            filter = filter.unique();
        }
        filter
    }
}

fn run(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    let config = args.reader_config()?;
    let url = config.redis_url.as_deref().unwrap_or(&args.url);
    let store = RedisStore::open(url)?;
    let reader = CounterReader::from_config(store, &config)?;

    if args.list_events {
        let mut events: Vec<String> = reader.captured_events()?.into_iter().collect();
        events.sort();
        return Ok(events.join("\n"));
    }

    if args.dimensions {
        let event = args.event.as_deref().unwrap_or(ALL_EVENTS);
        let mut lines = Vec::new();
        let mut objects: Vec<_> = reader.event_objects(event)?.into_iter().collect();
        objects.sort();
        for (oid, value) in objects {
            lines.push(format!("oid {}: {}", oid, value));
        }
        let mut envs: Vec<_> = reader.event_envs(event)?.into_iter().collect();
        envs.sort();
        for (env, value) in envs {
            lines.push(format!("env {}: {}", env, value));
        }
        return Ok(lines.join("\n"));
    }

    let granularities = if args.granularity.is_empty() {
        Granularity::ALL.to_vec()
    } else {
        args.granularity.clone()
    };
    let event = args.event.as_deref().unwrap_or(ALL_EVENTS);
    let report = reader.report(event, &granularities, &args.filter())?;

    let output = match args.format {
        OutputFormat::Table => TableObserver::new()
            .with_style(args.style.into())
            .with_title(format!("{}_{}", reader.namespace(), reader.app_id()))
            .render(&report.counts),
        OutputFormat::Compact => TableObserver::new()
            .compact(true)
            .columns(args.columns)
            .with_style(args.style.into())
            .render(&report.counts),
        OutputFormat::Json => JsonObserver::new()
            .pretty(args.pretty)
            .wrap_in_report(args.timestamp)
            .include_timestamp(args.timestamp)
            .to_json(&report.counts)?,
    };
    Ok(output)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}
