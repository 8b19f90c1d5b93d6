//! Wires the reader, the writer and the signal bridge together.

use crate::config::Config;
use crate::error::{OpenError, RelayError, EXIT_SUCCESS};
use crate::file::FileHandle;
use crate::pidfile;
use crate::queue;
use crate::reader::read_records;
use crate::signal::{Control, SignalBridge};
use crate::watch::DirWatch;
use crate::writer::{Report, Stop, Writer};
use std::num::NonZeroUsize;
use tokio::io::{self, AsyncBufRead, BufReader};
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, info};

/// An opened output file waiting for input
pub struct Relay {
    file: FileHandle,
    queue_capacity: NonZeroUsize,
}

impl Relay {
    /// Opens the output file, nothing else is touched if that fails
    pub async fn open(config: &Config) -> Result<Relay, OpenError> {
        let mut file = FileHandle::new(&config.output);
        file.open().await?;
        Ok(Relay {
            file,
            queue_capacity: config.queue_capacity,
        })
    }

    /// Copies `input` into the output file until EOF, a terminate control or a fatal error
    ///
    /// On a read error the queued records are abandoned.
    pub async fn run<R>(
        self,
        input: R,
        controls: mpsc::Receiver<Control>,
    ) -> Result<Report, RelayError>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, rx) = queue::bounded(self.queue_capacity);
        let mut reader = task::spawn(read_records(input, tx));
        let mut writer = task::spawn(Writer::new(self.file, rx, controls).run());

        tokio::select! {
            read = &mut reader => match read? {
                Ok(end) => {
                    debug!(?end, "reader finished");
                    Ok(writer.await??)
                }
                Err(err) => {
                    writer.abort();
                    // wait for the output file to be dropped
                    let _ = writer.await;
                    Err(err.into())
                }
            },
            written = &mut writer => {
                // a blocked stdin read can't be interrupted, the process exits around it
                reader.abort();
                Ok(written??)
            }
        }
    }
}

/// Runs the daemon on `stdin` with the given configuration
///
/// Signal handlers are installed before the pid file is written, so anybody reading the pid can
/// send `SIGHUP` right away.
pub async fn start(config: Config) -> Result<Report, RelayError> {
    let relay = Relay::open(&config).await?;

    let watch = if config.watch {
        Some(DirWatch::new(&config.output).map_err(RelayError::Watch)?)
    } else {
        None
    };
    let controls = SignalBridge::new(watch)
        .map_err(RelayError::Signal)?
        .spawn_forwarder();

    if let Some(path) = &config.pidfile {
        pidfile::write(path)?;
    }

    info!(
        output = %config.output,
        queue_capacity = config.queue_capacity.get(),
        watch = config.watch,
        "relaying stdin"
    );
    relay.run(BufReader::new(io::stdin()), controls).await
}

/// Process exit status for the outcome of a relay
///
/// A terminate signal maps to `128 + signal` like a shell reports a signal death.
pub fn exit_code(result: &Result<Report, RelayError>) -> i32 {
    match result {
        Ok(Report {
            stop: Stop::Drained,
            ..
        }) => EXIT_SUCCESS,
        Ok(Report {
            stop: Stop::Terminated { signal },
            ..
        }) => 128 + signal,
        Err(err) => err.exit_code(),
    }
}
