//! Fernet command-line tool.
//!
//! # Usage
//!
//! ```bash
//! # Create a key
//! fernet keygen
//!
//! # Issue a token (message from the argument or stdin)
//! fernet encrypt --key "$KEY" 'hello'
//!
//! # Check a token against the current and previous key
//! FERNET_KEY="$NEW,$OLD" fernet decrypt --ttl 3600 "$TOKEN"
//!
//! # Look at a token without a key
//! fernet inspect "$TOKEN"
//! ```

use std::{
    io::{self, Read, Write},
    process::ExitCode,
};

use clap::{Args as ClapArgs, Parser, Subcommand};
use fernet_cli::{CliError, PolicyArgs};
use fernet_token::TokenCodec;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Issue and validate Fernet tokens
#[derive(Parser, Debug)]
#[command(name = "fernet")]
#[command(about = "Issue and validate Fernet tokens")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a new random key
    Keygen,

    /// Encrypt a message into a token using the first key
    Encrypt {
        #[command(flatten)]
        keys: KeyArgs,

        /// Message to encrypt (read from stdin when omitted; one trailing
        /// newline is stripped from stdin)
        message: Option<String>,
    },

    /// Validate a token and print its plaintext
    Decrypt {
        #[command(flatten)]
        keys: KeyArgs,

        /// Token lifetime in seconds
        #[arg(long, default_value = "60")]
        ttl: u64,

        /// Accepted clock skew for tokens stamped in the future, in seconds
        #[arg(long, default_value = "60")]
        max_clock_skew: u64,

        /// Decrypt before verifying the signature (reference order, weaker)
        #[arg(long)]
        decrypt_first: bool,

        /// Write the raw plaintext instead of requiring UTF-8
        #[arg(long)]
        binary: bool,

        /// Token to validate (read from stdin when omitted)
        token: Option<String>,
    },

    /// Show the unauthenticated fields of a token
    Inspect {
        /// Token to inspect (read from stdin when omitted)
        token: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
struct KeyArgs {
    /// Encoded key; repeat for rotation, highest priority first
    #[arg(short, long = "key", env = "FERNET_KEY", value_delimiter = ',', hide_env_values = true)]
    keys: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(?err, "command failed");
            // Best effort: nothing useful remains if stderr is gone
            let _ = writeln!(io::stderr(), "error: {err}");
            ExitCode::from(err.exit_code())
        },
    }
}

fn run(command: Command) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();

    match command {
        Command::Keygen => {
            let codec = TokenCodec::with_system_env(PolicyArgs::default().to_config());
            writeln!(stdout, "{}", fernet_cli::keygen(&codec))?;
        },
        Command::Encrypt { keys, message } => {
            let keys = fernet_cli::parse_keys(&keys.keys)?;
            let message = match message {
                Some(message) => message,
                None => fernet_cli::strip_line_ending(&read_stdin()?).to_string(),
            };
            let codec = TokenCodec::with_system_env(PolicyArgs::default().to_config());
            writeln!(stdout, "{}", fernet_cli::encrypt(&codec, &keys, message.as_bytes())?)?;
        },
        Command::Decrypt { keys, ttl, max_clock_skew, decrypt_first, binary, token } => {
            let keys = fernet_cli::parse_keys(&keys.keys)?;
            let token = input_or_stdin(token)?;
            let policy = PolicyArgs { ttl_secs: ttl, max_clock_skew_secs: max_clock_skew, decrypt_first };
            let codec = TokenCodec::with_system_env(policy.to_config());

            let plaintext = fernet_cli::decrypt(&codec, &keys, token.trim(), binary)?;
            stdout.write_all(&plaintext)?;
            if !binary {
                writeln!(stdout)?;
            }
        },
        Command::Inspect { token } => {
            let token = input_or_stdin(token)?;
            writeln!(stdout, "{}", fernet_cli::inspect(token.trim())?)?;
        },
    }

    stdout.flush()?;
    Ok(())
}

fn input_or_stdin(arg: Option<String>) -> Result<String, CliError> {
    match arg {
        Some(value) => Ok(value),
        None => read_stdin(),
    }
}

fn read_stdin() -> Result<String, CliError> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    if buffer.is_empty() {
        return Err(CliError::Usage("no input given on the command line or stdin".to_string()));
    }
    Ok(buffer)
}
