//! greeter-demo CLI
//!
//! With no arguments, greets `User0` to `User2` and prints each greeting
//! next to the value held for that user:
//!
//! ```text
//! Hello, User0! 0
//! Hello, User1! 1
//! Hello, User2! 2
//! ```
//!
//! ## Commands
//!
//! - `run` (default): the greeting loop, as text or JSON
//! - `greet <NAME>`: print a single greeting
//! - `sample`: draw a random sample and print it with its sum
//!
//! ## Configuration
//!
//! `greeter.yaml` in the current directory is loaded when present, or the
//! file given with `--config`. Command-line flags win over the file.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Control logging verbosity (e.g., `info`, `debug`, `trace`)

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use greeter_demo::{greet, init_logging, Config, Driver, OutputFormat, RandomSample};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(author, version, about = "Greets a few users and sums a random sample", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./greeter.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the greeting loop
    Run(RunArgs),

    /// Print the greeting for a single name
    Greet {
        name: String,
    },

    /// Draw a random sample and print it with its sum
    Sample {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Number of users to greet
    #[arg(short, long)]
    iterations: Option<u32>,

    /// Prefix used to build user names
    #[arg(short, long)]
    prefix: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let logging = init_logging(&config.logging)?;
    if let Some(path) = &logging.log_file {
        debug!("Logging to {}", path.display());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Some(Commands::Greet { name }) => {
            writeln!(out, "{}", greet(&name))?;
        }

        Some(Commands::Sample { json }) => {
            config.sample.validate()?;
            let sample = RandomSample::draw_with(&mut rand::thread_rng(), &config.sample);
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&sample)?)?;
            } else {
                let values: Vec<String> = sample.values().iter().map(u32::to_string).collect();
                writeln!(out, "{} = {}", values.join(" + "), sample.sum())?;
            }
        }

        Some(Commands::Run(args)) => run(&mut config, args, &mut out)?,
        None => run(&mut config, RunArgs::default(), &mut out)?,
    }

    if let Some(report) = logging.verbosity.check_and_report() {
        eprintln!("{}", report);
    }
    Ok(())
}

fn run(config: &mut Config, args: RunArgs, out: &mut impl Write) -> Result<()> {
    if let Some(iterations) = args.iterations {
        config.driver.iterations = iterations;
    }
    if let Some(prefix) = args.prefix {
        config.driver.name_prefix = prefix;
    }
    config.validate()?;

    info!("Running {} iterations", config.driver.iterations);
    Driver::new(config.driver.clone(), config.sample.clone())
        .with_format(args.format)
        .run(out)?;
    Ok(())
}
