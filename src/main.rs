use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::error;
use tracing_subscriber::EnvFilter;
mod auth;
use argon2_harness::{Argon2Backend, ParameterTokens, execute, params};

/// Status for a missing salt: the primitive's `MISSING_ARGS` (-30) as a byte.
const MISSING_ARGS_STATUS: u8 = 226;

const LOG_ENV: &str = "ARGON2_HARNESS_LOG";

#[derive(Debug, Parser)]
#[command(name = "argon2-harness")]
#[command(
    version,
    about = "Hashes a password read from stdin with Argon2 and verifies the encoded result.",
    disable_help_flag = true
)]
struct Cli {
    /// The salt to use, at most 16 characters
    salt: Option<String>,

    /// Use Argon2d instead of Argon2i (which is the default)
    #[arg(short = 'd')]
    data_dependent: bool,

    /// Sets the number of iterations to N
    #[arg(short = 't', value_name = "N", env = "ARGON2_TIME_COST",
          default_value_t = params::DEFAULT_TIME_COST.to_string())]
    time_cost: String,

    /// Sets the memory usage of 2^N KiB
    #[arg(short = 'm', value_name = "N", env = "ARGON2_MEMORY_EXPONENT",
          default_value_t = params::DEFAULT_MEMORY_EXPONENT.to_string())]
    memory_exponent: String,

    /// Sets parallelism to N threads
    #[arg(short = 'p', value_name = "N", env = "ARGON2_PARALLELISM",
          default_value_t = params::DEFAULT_PARALLELISM.to_string())]
    parallelism: String,

    /// Sets hash output length to N bytes
    #[arg(short = 'h', value_name = "N", env = "ARGON2_HASH_LENGTH",
          default_value_t = params::DEFAULT_OUTPUT_LEN.to_string())]
    hash_length: String,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    help: Option<bool>,
}

impl Cli {
    fn parameter_tokens(&self) -> ParameterTokens {
        ParameterTokens {
            data_dependent: self.data_dependent,
            time_cost: Some(self.time_cost.clone()),
            memory_exponent: Some(self.memory_exponent.clone()),
            parallelism: Some(self.parallelism.clone()),
            output_len: Some(self.hash_length.clone()),
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(salt: &str, cli: &Cli) -> Result<()> {
    let mut password = auth::read_password()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    execute(&Argon2Backend, salt, &cli.parameter_tokens(), &mut password, &mut out)
        .map_err(|err| {
            if err.is_internal() {
                error!(error = %err, "internal invariant violated");
            }
            err
        })?;
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let Some(salt) = cli.salt.as_deref() else {
        let _ = Cli::command().print_help();
        return ExitCode::from(MISSING_ARGS_STATUS);
    };

    match run(salt, &cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
