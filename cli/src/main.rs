#![deny(missing_docs)]

//! # OAS Params CLI
//!
//! Command line front-end over the parameter codec.
//!
//! Supported Commands:
//! - `decode`: raw parameter string -> JSON value tree.
//! - `encode`: JSON value tree -> raw parameter string.
//! - `styles`: the allowed styles per location with their defaults.

use clap::{Args, Parser, Subcommand};
use oas_params_core::{Codec, CodecConfig, CodecResult, Options};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod decode;
mod encode;
mod error;
mod styles;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI parameter codec CLI")]
struct Cli {
    /// YAML or JSON codec configuration file.
    #[clap(long, global = true, env = "OAS_PARAMS_CONFIG")]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a raw parameter string and print the value tree as JSON.
    Decode(decode::DecodeArgs),
    /// Encode a JSON value tree into a raw parameter string.
    Encode(encode::EncodeArgs),
    /// Print the allowed styles for every location.
    Styles,
}

/// Location, style and explode flag of a parameter.
#[derive(Args, Debug, Clone)]
pub struct ParamArgs {
    /// Parameter location: query, path, header or cookie.
    #[clap(long, short = 'l', default_value = "query")]
    pub location: String,

    /// Serialization style; defaults per location.
    #[clap(long, short = 's')]
    pub style: Option<String>,

    /// Explode flag; defaults per style.
    #[clap(long, short = 'e')]
    pub explode: Option<bool>,
}

impl ParamArgs {
    /// Validated options from the arguments.
    pub fn options(&self) -> CodecResult<Options> {
        Options::parse(&self.location, self.style.as_deref(), self.explode)
    }
}

fn codec(config: Option<&PathBuf>) -> CliResult<Codec> {
    let config = match config {
        Some(path) => CodecConfig::load(path)?,
        None => CodecConfig::default(),
    };
    tracing::debug!(?config, "codec configuration");
    Ok(Codec::builder().config(config).build())
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let codec = codec(cli.config.as_ref())?;
    let mut out = io::stdout().lock();

    match &cli.command {
        Commands::Decode(args) => decode::execute(args, &codec, &mut out)?,
        Commands::Encode(args) => encode::execute(args, &codec, &mut io::stdin().lock(), &mut out)?,
        Commands::Styles => styles::execute(&mut out)?,
    }

    Ok(())
}
