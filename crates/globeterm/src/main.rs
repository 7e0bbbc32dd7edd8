#![forbid(unsafe_code)]

//! globeterm binary entry point.

use std::io::{self, IsTerminal};
use std::process;

use globeterm::cli::{self, Command};
use globeterm::logging;
use globeterm_core::Error;

/// Exit status for rejected configuration.
const EXIT_USAGE: i32 = 2;
/// Exit status for terminal or output failures.
const EXIT_FAILURE: i32 = 1;

fn main() {
    let opts = match cli::Opts::parse() {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            println!("{}", cli::HELP_TEXT);
            return;
        }
        Ok(Command::Version) => {
            println!("globeterm {}", cli::VERSION);
            return;
        }
        Err(err) => {
            eprintln!("globeterm: {err}");
            eprintln!("Try 'globeterm --help' for more information.");
            process::exit(EXIT_USAGE);
        }
    };

    if !(io::stdin().is_terminal() && io::stdout().is_terminal()) {
        eprintln!("globeterm requires an interactive terminal");
        process::exit(EXIT_FAILURE);
    }

    if let Some(path) = opts.log_file.as_deref()
        && let Err(err) = logging::init(path, opts.log_filter.as_deref())
    {
        eprintln!("globeterm: cannot open log file {}: {err}", path.display());
        process::exit(EXIT_FAILURE);
    }

    let code = match globeterm_runtime::run(&opts.runtime_config()) {
        Ok(reason) => reason.exit_code(),
        Err(err) => {
            tracing::error!(error = %err, "globeterm stopped");
            eprintln!("globeterm: {err}");
            match err {
                Error::InvalidConfiguration(_) => EXIT_USAGE,
                _ => EXIT_FAILURE,
            }
        }
    };
    process::exit(code);
}
