use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;
use tokio::task::JoinError;

/// exit status for a clean end of input or any failure that isn't a read error
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_READ_FAILURE: i32 = 2;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("output file path required")]
    MissingOutput,
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,
    #[error("read config file `{path}`")]
    ReadFile {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse config file `{path}`")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("write pid file `{path}`")]
    PidFile {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
#[error("open output file `{path}`")]
pub struct OpenError {
    pub path: Utf8PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("write record to `{path}`")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("output file `{path}` is closed")]
    Closed { path: Utf8PathBuf },
}

#[derive(Error, Debug)]
#[error("reopen output file `{path}`")]
pub struct ReopenError {
    pub path: Utf8PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Error, Debug)]
#[error("read stdin")]
pub struct ReadError(#[from] pub io::Error);

/// Everything that can end the relay with a non-zero status
#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("install signal handlers")]
    Signal(#[source] io::Error),
    #[error("watch output directory")]
    Watch(#[source] io::Error),
    #[error("relay task failed")]
    Task(#[from] JoinError),
}

impl RelayError {
    /// read failures are distinguishable from everything else
    pub fn exit_code(&self) -> i32 {
        match self {
            RelayError::Read(_) => EXIT_READ_FAILURE,
            _ => EXIT_FAILURE,
        }
    }
}
