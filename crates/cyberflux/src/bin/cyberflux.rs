use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};

use cyberflux::arrival::run_simulation;
use cyberflux::common::cli::RootOptions;
use cyberflux::common::setup::setup_logging;
use cyberflux::config::RunConfig;
use cyberflux::narration::NarrationObserver;
use cyberflux::output::create_output;
use cyberflux::output::outputs::Output;

async fn command_simulate(printer: &dyn Output, opts: RootOptions) -> anyhow::Result<()> {
    let config = RunConfig::from_opts(opts.simulation)?;
    printer.print_parameters(&config);

    let observer = Arc::new(NarrationObserver::new(config.verbosity));
    let report = run_simulation(&config, observer).await?;
    printer.print_report(&config, &report);
    Ok(())
}

#[tokio::main]
async fn main() {
    let matches = RootOptions::command().get_matches();
    let top_opts = match RootOptions::from_arg_matches(&matches) {
        Ok(opts) => opts,
        Err(error) => error.exit(),
    };

    setup_logging(top_opts.common.debug);

    let printer = create_output(&top_opts.common);

    if let Err(e) = command_simulate(printer.as_ref(), top_opts).await {
        printer.print_error(e);
        std::process::exit(1);
    }
}
