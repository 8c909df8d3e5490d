use std::path::PathBuf;

use anyhow::Result;
use areamap::Point;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "areamap")]
#[command(about = "Build, inspect and query area collision maps")]
#[command(version)]
struct Cli {
    /// Config file (defaults to areamap.toml in the working directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an area record from a captured world snapshot
    Build {
        /// World snapshot (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Area id to build
        #[arg(short, long)]
        area: u32,

        /// Generate the coarse path grid and include it in the output
        #[arg(long)]
        path_data: bool,

        /// Narrowest boundary opening that becomes an exit
        #[arg(long)]
        min_exit_width: Option<i32>,

        /// Indent output by this many spaces (0 = compact)
        #[arg(long, default_value_t = 0)]
        indent: usize,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize an area record and check its bitmap encoding
    Info {
        /// Area record (JSON)
        record: PathBuf,
    },

    /// Find a path between two global positions
    Path {
        /// Area record (JSON)
        record: PathBuf,

        /// Start position as x,y
        #[arg(long, value_parser = parse_point)]
        from: Point,

        /// Target position as x,y
        #[arg(long, value_parser = parse_point)]
        to: Point,

        /// Reduce the path to straight-line waypoints
        #[arg(long)]
        merge: bool,
    },

    /// Draw one or more area records as text
    Render {
        /// Area records (JSON), drawn at their global positions
        #[arg(required = true)]
        records: Vec<PathBuf>,

        /// Outline blocked cells next to walkable ones
        #[arg(long)]
        edges: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("invalid x '{}': {}", x, e))?;
    let y = y.trim().parse().map_err(|e| format!("invalid y '{}': {}", y, e))?;
    Ok(Point::new(x, y))
}

fn main() -> Result<()> {
    // Logs go to stderr so records can be piped from stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("areamap=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load_or_default(cli.config.as_deref());

    match cli.command {
        Command::Build {
            snapshot,
            area,
            path_data,
            min_exit_width,
            indent,
            output,
        } => {
            let mut options = config.build;
            options.generate_path_data |= path_data;
            if let Some(width) = min_exit_width {
                options.min_exit_width = width;
            }
            commands::build::run(&snapshot, area, options, indent, output.as_deref())
        }
        Command::Info { record } => commands::info::run(&record),
        Command::Path {
            record,
            from,
            to,
            merge,
        } => commands::path::run(&record, from, to, merge),
        Command::Render {
            records,
            edges,
            no_color,
        } => {
            let mut style = config.render;
            if no_color {
                style.color = false;
            }
            commands::render::run(&records, &style, edges)
        }
    }
}
