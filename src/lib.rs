//! Appends newline-delimited records from `stdin` to a file and reopens the file on `SIGHUP`.
//!
//! The reader and the writer run as two tasks joined by a bounded queue. The writer is the only
//! owner of the output file, so rotation is a plain swap of the descriptor it holds.

pub mod config;
pub mod error;
pub mod file;
pub mod pidfile;
pub mod queue;
pub mod reader;
pub mod relay;
pub mod signal;
pub mod watch;
pub mod writer;
