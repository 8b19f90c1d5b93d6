//! Appends `stdin` to a file, reopening it on `SIGHUP` so log rotation works.
//!
//! ```text
//! some-service | huppend --pidfile /run/some-service-log.pid /var/log/some-service.log
//! mv /var/log/some-service.log /var/log/some-service.log.1
//! kill -HUP "$(cat /run/some-service-log.pid)"
//! ```
//!
//! Exits with 0 when `stdin` ends and everything was written, 1 for configuration, open or write
//! errors, 2 when reading `stdin` fails and `128 + signal` after `SIGTERM`/`SIGINT`.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use huppend::config::{Config, FileConfig, Overrides};
use huppend::error::EXIT_FAILURE;
use huppend::relay;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// File the input is appended to
    output: Option<Utf8PathBuf>,

    /// Write the process id into this file at startup
    #[clap(long)]
    pidfile: Option<Utf8PathBuf>,

    /// Number of lines held in memory before reading `stdin` is paused [default: 200]
    #[clap(long, alias = "linebuf")]
    queue_capacity: Option<usize>,

    /// Also reopen the output file when it gets moved away or deleted
    #[clap(long)]
    watch: bool,

    /// TOML config file, command line arguments take precedence over it
    #[clap(long)]
    config: Option<Utf8PathBuf>,
}

fn config(args: Args) -> Result<Config> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let overrides = Overrides {
        output: args.output,
        queue_capacity: args.queue_capacity,
        pidfile: args.pidfile,
        watch: args.watch,
    };
    Config::new(file, overrides).context("invalid configuration")
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("huppend=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        // usage errors are configuration errors, exit status 2 belongs to read failures
        Err(err) if err.use_stderr() => {
            error!("{err}");
            process::exit(EXIT_FAILURE);
        }
        // --help and --version
        Err(err) => err.exit(),
    };

    let config = match config(args) {
        Ok(config) => config,
        Err(err) => {
            error!("{err:#}");
            process::exit(EXIT_FAILURE);
        }
    };

    let result = relay::start(config).await;
    let code = relay::exit_code(&result);
    if let Err(err) = result {
        error!("{:#}", anyhow::Error::from(err));
    }
    // exit right here, dropping the runtime would wait for a stdin read that may never finish
    process::exit(code);
}
