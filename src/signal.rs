//! Turns OS signals into [`Control`] events for the writer.
//!
//! - `SIGHUP`: reopen the output file
//! - `SIGTERM`/`SIGINT`: stop immediately, abandoning queued records

use crate::watch::DirWatch;
use std::future;
use std::io;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub const SIGINT: i32 = 2;
pub const SIGTERM: i32 = 15;

/// Out of band requests for the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Rotate,
    Terminate { signal: i32 },
}

/// Buffer for controls that arrive while the writer is busy with a write
const CONTROL_BUFFER: usize = 32;

pub struct SignalBridge {
    sighup: Signal,
    sigterm: Signal,
    sigint: Signal,
    watch: Option<DirWatch>,
}

impl SignalBridge {
    /// Subscribes to the signals, must happen before the default `SIGHUP` action can kill us
    pub fn new(watch: Option<DirWatch>) -> io::Result<SignalBridge> {
        Ok(SignalBridge {
            sighup: signal(SignalKind::hangup())?,
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
            watch,
        })
    }

    /// Waits for the next control event
    pub async fn next(&mut self) -> Control {
        loop {
            let watch = self.watch.as_mut();
            let watch = async move {
                match watch {
                    Some(watch) => watch.next().await,
                    None => future::pending().await,
                }
            };
            tokio::select! {
                _ = self.sighup.recv() => {
                    debug!("received SIGHUP");
                    break Control::Rotate;
                }
                _ = self.sigterm.recv() => {
                    debug!("received SIGTERM");
                    break Control::Terminate { signal: SIGTERM };
                }
                _ = self.sigint.recv() => {
                    debug!("received SIGINT");
                    break Control::Terminate { signal: SIGINT };
                }
                event = watch => match event {
                    Ok(true) => {
                        debug!("output file moved away");
                        break Control::Rotate;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        warn!(error = %err, "output directory watch failed, disabling it");
                        self.watch = None;
                    }
                },
            }
        }
    }

    /// Spawns a task forwarding controls in the order they arrive
    pub fn spawn_forwarder(mut self) -> mpsc::Receiver<Control> {
        let (tx, rx) = mpsc::channel(CONTROL_BUFFER);

        tokio::spawn(async move {
            loop {
                let control = self.next().await;
                if tx.send(control).await.is_err() {
                    // writer is gone
                    break;
                }
            }
        });

        rx
    }
}
