use crate::error::ConfigError;
use camino::Utf8Path;
use std::fs;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::process;

/// Writes the current pid followed by a newline, truncating anything that was there
pub fn write(path: &Utf8Path) -> Result<(), ConfigError> {
    write_pid(path, process::id()).map_err(|source| ConfigError::PidFile {
        path: path.to_owned(),
        source,
    })
}

fn write_pid(path: &Utf8Path, pid: u32) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)?;
    writeln!(file, "{pid}")
}
