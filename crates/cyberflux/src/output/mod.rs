pub mod cli;
pub mod json;
pub mod outputs;
pub mod quiet;

use std::io::IsTerminal;

use cli_table::ColorChoice;

use crate::common::cli::{ColorPolicy, CommonOpts};
use crate::output::cli::CliOutput;
use crate::output::json::JsonOutput;
use crate::output::outputs::{Output, Outputs};
use crate::output::quiet::Quiet;

/// Creates the printer selected on the command line.
pub fn create_output(opts: &CommonOpts) -> Box<dyn Output> {
    let color_policy = match opts.colors {
        ColorPolicy::Always => ColorChoice::AlwaysAnsi,
        ColorPolicy::Auto => {
            if std::io::stdout().is_terminal() {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            }
        }
        ColorPolicy::Never => ColorChoice::Never,
    };

    match opts.output_mode {
        Outputs::CLI => {
            // Set colored public for CLI
            match color_policy {
                ColorChoice::Always | ColorChoice::AlwaysAnsi => {
                    colored::control::set_override(true)
                }
                ColorChoice::Never => colored::control::set_override(false),
                _ => {}
            }

            Box::new(CliOutput::new(color_policy))
        }
        Outputs::JSON => Box::<JsonOutput>::default(),
        Outputs::Quiet => Box::<Quiet>::default(),
    }
}
