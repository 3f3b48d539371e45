use subcue::cli::{self, Cli};

use std::io;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = cli::read_input(&cli.input)
        .and_then(|data| cli::run(&cli, &data, &mut io::stdout().lock()));
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "subcue=warn",
        1 => "subcue=info",
        2 => "subcue=debug",
        _ => "subcue=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
