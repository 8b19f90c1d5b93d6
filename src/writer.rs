//! The single consumer of the record queue and the only owner of the output file.

use crate::error::WriteError;
use crate::file::FileHandle;
use crate::queue::RecordReceiver;
use crate::signal::Control;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Why the writer stopped without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// the input ended and every queued record was written
    Drained,
    /// a terminate signal arrived, queued records were abandoned
    Terminated { signal: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub stop: Stop,
    pub records: u64,
    pub bytes: u64,
    pub rotations: u64,
    pub failed_rotations: u64,
}

enum State {
    Running,
    Stopped(Result<Stop, WriteError>),
}

pub struct Writer {
    file: FileHandle,
    records: RecordReceiver,
    controls: mpsc::Receiver<Control>,
    report: Report,
}

impl Writer {
    /// `file` is expected to be open already
    pub fn new(
        file: FileHandle,
        records: RecordReceiver,
        controls: mpsc::Receiver<Control>,
    ) -> Writer {
        Writer {
            file,
            records,
            controls,
            report: Report {
                stop: Stop::Drained,
                records: 0,
                bytes: 0,
                rotations: 0,
                failed_rotations: 0,
            },
        }
    }

    /// Runs until the queue is drained, a terminate control arrives or a write fails
    ///
    /// The output file is closed whichever way it ends.
    pub async fn run(mut self) -> Result<Report, WriteError> {
        let mut controls_open = true;
        let result = loop {
            // controls first so a busy queue can't hold off a terminate
            let state = tokio::select! {
                biased;
                control = self.controls.recv(), if controls_open => match control {
                    Some(control) => self.on_control(control).await,
                    None => {
                        controls_open = false;
                        State::Running
                    }
                },
                record = self.records.pop() => match record {
                    Some(record) => match self.file.write(record.as_slice()).await {
                        Ok(()) => {
                            self.report.records += 1;
                            self.report.bytes += record.len() as u64;
                            State::Running
                        }
                        Err(err) => State::Stopped(Err(err)),
                    },
                    None => State::Stopped(Ok(Stop::Drained)),
                },
            };
            if let State::Stopped(result) = state {
                break result;
            }
        };

        self.records.close();
        self.file.close().await;

        let stop = result?;
        self.report.stop = stop;
        info!(
            path = %self.file.path(),
            stop = ?stop,
            records = self.report.records,
            bytes = self.report.bytes,
            rotations = self.report.rotations,
            failed_rotations = self.report.failed_rotations,
            "writer stopped"
        );
        Ok(self.report)
    }

    async fn on_control(&mut self, control: Control) -> State {
        match control {
            Control::Rotate => {
                match self.file.reopen().await {
                    Ok(()) => {
                        self.report.rotations += 1;
                        info!(path = %self.file.path(), "reopened output file");
                    }
                    Err(err) => {
                        // keep writing to the old file
                        self.report.failed_rotations += 1;
                        warn!("rotation failed: {:#}", anyhow::Error::from(err));
                    }
                }
                State::Running
            }
            Control::Terminate { signal } => {
                info!(signal, "terminating, queued records are dropped");
                State::Stopped(Ok(Stop::Terminated { signal }))
            }
        }
    }
}
