use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use dot2bgraph_core::LayoutConfig;
use dot2bgraph_error::{Error, Result};

/// Lays out a hierarchical Graphviz DOT graph as a flat block graph.
#[derive(Parser, Debug)]
#[command(name = "dot2bgraph", about = "Lay out a DOT graph as a flat block graph", version)]
pub struct Cli {
    /// DOT source file to read. Omit, or pass "-", to read from stdin.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write JSON output to this file instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pretty-print the output JSON.
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Padding between a region's border and its children.
    #[arg(long = "padding-outer")]
    padding_outer: Option<i64>,

    /// Padding between adjacent rows or packed rectangles.
    #[arg(long = "padding-inner")]
    padding_inner: Option<i64>,
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    let mut buf = String::new();
    match path {
        Some(p) if p.as_os_str() != "-" => {
            buf = std::fs::read_to_string(p).map_err(Error::from)?;
        }
        _ => {
            std::io::stdin().read_to_string(&mut buf).map_err(Error::from)?;
        }
    }
    Ok(buf)
}

fn write_output(path: &Option<PathBuf>, json: &str) -> Result<()> {
    match path {
        Some(p) => std::fs::write(p, json).map_err(Error::from),
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(json.as_bytes()).map_err(Error::from)?;
            stdout.write_all(b"\n").map_err(Error::from)
        }
    }
}

fn run(args: &Cli) -> Result<()> {
    let mut config = LayoutConfig::default();
    if let Some(padding_outer) = args.padding_outer {
        config.padding_outer = padding_outer;
    }
    if let Some(padding_inner) = args.padding_inner {
        config.padding_inner = padding_inner;
    }

    let source = read_input(&args.input)?;

    tracing::debug!(bytes = source.len(), "parsing DOT source");
    let graph = dot2bgraph_dot::parse(&source)?;

    let locations = dot2bgraph_core::layout(&graph, &config)?;
    let output = locations.to_output();

    let json = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .map_err(|e| {
        Error::serialization_failed(e.to_string()).with_operation("dot2bgraph::main::run")
    })?;

    write_output(&args.output, &json)
}

pub fn main() -> ExitCode {
    let args = Cli::parse();

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let start = Instant::now();
    let result = run(&args);
    tracing::debug!(elapsed_secs = start.elapsed().as_secs_f64(), "done");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
