use crate::error::ConfigError;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;

mod default {
    pub fn queue_capacity() -> usize {
        super::DEFAULT_QUEUE_CAPACITY
    }
}

/// records allowed in memory before the reader is blocked
pub const DEFAULT_QUEUE_CAPACITY: usize = 200;

/// Config file structure, every field can also be given on the command line
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// File the records are appended to
    #[serde(default)]
    pub output: Option<Utf8PathBuf>,

    /// Number of records allowed in the queue before the reader is blocked
    #[serde(default = "default::queue_capacity")]
    pub queue_capacity: usize,

    /// Where to write the pid at startup
    #[serde(default)]
    pub pidfile: Option<Utf8PathBuf>,

    /// Reopen the output file when it's moved away or deleted, even without `SIGHUP`
    #[serde(default)]
    pub watch: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        FileConfig {
            output: None,
            queue_capacity: default::queue_capacity(),
            pidfile: None,
            watch: false,
        }
    }
}

impl FileConfig {
    pub fn from_toml(path: &Utf8Path, text: &str) -> Result<FileConfig, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn load(path: &Utf8Path) -> Result<FileConfig, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_owned(),
            source,
        })?;
        FileConfig::from_toml(path, &text)
    }
}

/// Values given on the command line, they take precedence over the config file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub output: Option<Utf8PathBuf>,
    pub queue_capacity: Option<usize>,
    pub pidfile: Option<Utf8PathBuf>,
    pub watch: bool,
}

/// Validated configuration, built once at startup and passed down explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub output: Utf8PathBuf,
    pub queue_capacity: NonZeroUsize,
    pub pidfile: Option<Utf8PathBuf>,
    pub watch: bool,
}

impl Config {
    pub fn new(file: FileConfig, overrides: Overrides) -> Result<Config, ConfigError> {
        let output = overrides
            .output
            .or(file.output)
            .ok_or(ConfigError::MissingOutput)?;
        let queue_capacity = overrides.queue_capacity.unwrap_or(file.queue_capacity);
        let queue_capacity = NonZeroUsize::new(queue_capacity).ok_or(ConfigError::ZeroCapacity)?;

        Ok(Config {
            output,
            queue_capacity,
            pidfile: overrides.pidfile.or(file.pidfile),
            watch: overrides.watch || file.watch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<FileConfig, ConfigError> {
        FileConfig::from_toml(Utf8Path::new("huppend.toml"), text)
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(parse("").unwrap(), FileConfig::default());
    }

    #[test]
    fn full_file() {
        let file = parse(
            r#"
            output = "/var/log/app/current"
            queue_capacity = 16
            pidfile = "/run/app-log.pid"
            watch = true
            "#,
        )
        .unwrap();
        let config = Config::new(file, Overrides::default()).unwrap();
        assert_eq!(
            config,
            Config {
                output: "/var/log/app/current".into(),
                queue_capacity: NonZeroUsize::new(16).unwrap(),
                pidfile: Some("/run/app-log.pid".into()),
                watch: true,
            }
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            parse("linebuf = 10"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn command_line_wins() {
        let file = parse("output = \"from-file.log\"\nqueue_capacity = 5\n").unwrap();
        let config = Config::new(
            file,
            Overrides {
                output: Some("from-args.log".into()),
                queue_capacity: Some(1),
                pidfile: None,
                watch: false,
            },
        )
        .unwrap();
        assert_eq!(config.output, "from-args.log");
        assert_eq!(config.queue_capacity.get(), 1);
    }

    #[test]
    fn output_is_required() {
        assert!(matches!(
            Config::new(FileConfig::default(), Overrides::default()),
            Err(ConfigError::MissingOutput)
        ));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let overrides = Overrides {
            output: Some("out.log".into()),
            queue_capacity: Some(0),
            ..Overrides::default()
        };
        assert!(matches!(
            Config::new(FileConfig::default(), overrides),
            Err(ConfigError::ZeroCapacity)
        ));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        assert!(matches!(
            FileConfig::load(Utf8Path::new("/nonexistent/huppend.toml")),
            Err(ConfigError::ReadFile { .. })
        ));
    }
}
