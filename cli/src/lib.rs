use anyhow::{Error, Result};
use cdt_lists::config::{Config, ConfigBuilder};
use cdt_lists::util::convert;
use clap::Parser;
use log::{debug, info};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "convert-rdf-lists")]
#[command(version)]
#[command(about = "Converts RDF lists into SPARQL-CDT list literals")]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Predicate IRI whose objects are lists to convert (can be provided multiple times)
    #[clap(long = "predicate", value_name = "IRI")]
    predicates: Vec<String>,
    /// Syntax of the input; guessed from the file extension of the input file if not given
    #[clap(long)]
    insyntax: Option<String>,
    /// File with the input data; reads from stdin if not given
    #[clap(long)]
    infile: Option<PathBuf>,
    /// File for the output data; writes to stdout if not given
    #[clap(long)]
    outfile: Option<PathBuf>,
    /// Syntax of the output, defaults to turtle
    #[clap(long, visible_alias = "output")]
    outsyntax: Option<String>,
    /// Base IRI for resolving relative IRIs in the input
    #[clap(long)]
    base: Option<String>,
    /// JSON configuration file; command line arguments override its values
    #[clap(long)]
    config: Option<PathBuf>,
    /// Print the overall processing time to stderr
    #[clap(long, action, default_value = "false")]
    time: bool,
    /// Verbose mode - sets the RUST_LOG level to info, defaults to warning level
    #[clap(long, short, action, default_value = "false")]
    verbose: bool,
    /// Debug mode - sets the RUST_LOG level to debug, defaults to warning level
    #[clap(long, action, default_value = "false")]
    debug: bool,
    /// Print the resolved configuration and exit without converting
    #[clap(long, action, default_value = "false")]
    show_config: bool,
}

pub fn run() -> Result<()> {
    cdt_lists::init_logging();
    let cmd = Cli::parse();
    execute(cmd)
}

pub fn run_from_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    cdt_lists::init_logging();
    let cmd = Cli::try_parse_from(args).map_err(Error::from)?;
    execute(cmd)
}

/// Merges the command line over the optional configuration file.
fn build_config(cmd: &Cli) -> Result<Config> {
    let file = match &cmd.config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            Some(Config::from_file(path)?)
        }
        None => None,
    };

    let mut predicates = file
        .as_ref()
        .map(|c| c.predicates.clone())
        .unwrap_or_default();
    for p in &cmd.predicates {
        if !predicates.contains(p) {
            predicates.push(p.clone());
        }
    }

    let mut builder = ConfigBuilder::default();
    builder
        .predicates(predicates)
        .time(cmd.time || file.as_ref().is_some_and(|c| c.time));

    let input = cmd.infile.clone().or(file.as_ref().and_then(|c| c.input.clone()));
    if let Some(input) = input {
        builder.input(input);
    }
    let output = cmd
        .outfile
        .clone()
        .or(file.as_ref().and_then(|c| c.output.clone()));
    if let Some(output) = output {
        builder.output(output);
    }
    let input_syntax = cmd
        .insyntax
        .clone()
        .or(file.as_ref().and_then(|c| c.input_syntax.clone()));
    if let Some(syntax) = input_syntax {
        builder.input_syntax(syntax);
    }
    let output_syntax = cmd
        .outsyntax
        .clone()
        .or(file.as_ref().and_then(|c| c.output_syntax.clone()));
    if let Some(syntax) = output_syntax {
        builder.output_syntax(syntax);
    }
    let base = cmd
        .base
        .clone()
        .or(file.as_ref().and_then(|c| c.base_iri.clone()));
    if let Some(base) = base {
        builder.base_iri(base);
    }

    Ok(builder.build()?)
}

fn execute(cmd: Cli) -> Result<()> {
    // The RUST_LOG env var is set by `init_logging` if CDT_LISTS_LOG is present.
    // CLI flags for verbosity take precedence. If nothing is set, we default to "warn".
    if cmd.debug {
        std::env::set_var("RUST_LOG", "debug");
    } else if cmd.verbose {
        std::env::set_var("RUST_LOG", "info");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    let _ = env_logger::try_init();

    let config = build_config(&cmd)?;
    if cmd.show_config {
        config.print();
        return Ok(());
    }

    let stats = convert(&config)?;
    info!(
        "Done: {} lists converted, {} triples passed through, {} collection triples kept",
        stats.lists_converted, stats.passthrough, stats.leftovers
    );
    Ok(())
}
