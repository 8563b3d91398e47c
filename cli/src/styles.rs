//! # Styles Command
//!
//! Prints the style rules: allowed styles per location, the default style
//! (`*`) and each style's default explode flag.

use crate::error::CliResult;
use oas_params_core::{allowed_styles, default_explode, default_style, ParameterLocation};
use std::io::Write;

/// Executes the styles command.
pub fn execute(out: &mut impl Write) -> CliResult<()> {
    for location in ParameterLocation::ALL {
        let default = default_style(location);
        let styles: Vec<String> = allowed_styles(location)
            .iter()
            .map(|style| {
                let marker = if *style == default { "*" } else { "" };
                format!("{}{} (explode={})", style, marker, default_explode(*style))
            })
            .collect();
        writeln!(out, "{:<8} {}", location.as_str(), styles.join(", "))?;
    }
    Ok(())
}
