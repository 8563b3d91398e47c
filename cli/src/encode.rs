//! # Encode Command
//!
//! Reads a JSON value tree (argument or stdin) and prints the encoded
//! parameter string.

use crate::error::CliResult;
use crate::ParamArgs;
use oas_params_core::{Codec, ParamValue};
use std::io::{Read, Write};

/// Arguments for the encode command.
#[derive(clap::Args, Debug, Clone)]
pub struct EncodeArgs {
    #[clap(flatten)]
    pub params: ParamArgs,

    /// JSON value to encode, `-` to read it from stdin. Keyed styles take an
    /// object of parameter name to value.
    pub json: String,
}

/// Executes the encode command.
pub fn execute(
    args: &EncodeArgs,
    codec: &Codec,
    input: &mut impl Read,
    out: &mut impl Write,
) -> CliResult<()> {
    let options = args.params.options()?;
    let tree = if args.json == "-" {
        let mut text = Vec::new();
        input.read_to_end(&mut text)?;
        ParamValue::from_json_slice(&text)?
    } else {
        ParamValue::from_json_slice(args.json.as_bytes())?
    };
    writeln!(out, "{}", codec.encode(&tree, &options)?)?;
    Ok(())
}
