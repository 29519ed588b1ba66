use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fedicat::address::Matcher;
use fedicat::app::{AppContext, FedicatError};
use fedicat::cli::commands::{self, Request};
use fedicat::cli::Cli;
use fedicat::output::{self, Output};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let request = match Matcher::standard().parse(&cli.address) {
        Some(descriptor) => Request::from_descriptor(&descriptor, cli.budget()),
        None => Err(FedicatError::UnsupportedAddress(cli.address.clone())),
    };
    let request = match request {
        Ok(request) => request,
        Err(e) => {
            Cli::command().error(ErrorKind::ValueValidation, e).print()?;
            std::process::exit(1);
        }
    };

    let ctx = AppContext::load(cli.debug)?;

    let interactive = output::interactive();
    let links = output::link_style(interactive, cli.no_pager);
    let mut out = if interactive && !cli.no_pager {
        Output::pager(&ctx.config.pager_command())?
    } else {
        Output::stdout()
    };

    let result = commands::run(&ctx, request, &mut out, links).await;
    let finished = out.finish();
    result?;
    finished?;

    Ok(())
}
