//! # Decode Command
//!
//! Decodes one raw parameter string and prints the tree as pretty JSON.

use crate::error::CliResult;
use crate::ParamArgs;
use oas_params_core::Codec;
use std::io::Write;

/// Arguments for the decode command.
#[derive(clap::Args, Debug, Clone)]
pub struct DecodeArgs {
    #[clap(flatten)]
    pub params: ParamArgs,

    /// The raw parameter string (query string, path segment, header value...).
    pub raw: String,
}

/// Executes the decode command.
pub fn execute(args: &DecodeArgs, codec: &Codec, out: &mut impl Write) -> CliResult<()> {
    let options = args.params.options()?;
    let tree = codec.decode(&args.raw, &options)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&tree.to_json())?)?;
    Ok(())
}
