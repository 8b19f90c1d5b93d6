//! Notices the output file being renamed or deleted under us.
//!
//! Rotators that don't send `SIGHUP` still move the file away, watching the parent directory for
//! that lets the writer reopen anyway. The directory is watched instead of the file itself so the
//! watch keeps working across any number of rotations.

use camino::Utf8Path;
use inotify::{Event, EventMask, EventStream, Inotify, WatchMask};
use std::ffi::{OsStr, OsString};
use std::io;
use tokio_stream::StreamExt;

const EVENT_BUFFER_SIZE: usize = 4096;

pub struct DirWatch {
    file_name: OsString,
    events: EventStream<Box<[u8]>>,
}

impl DirWatch {
    /// Starts watching the directory containing `path`
    pub fn new(path: &Utf8Path) -> io::Result<DirWatch> {
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("`{path}` does not name a file"),
            )
        })?;
        let dir = match path.parent() {
            Some(dir) if !dir.as_str().is_empty() => dir,
            _ => Utf8Path::new("."),
        };

        let inotify = Inotify::init()?;
        inotify
            .watches()
            .add(dir, WatchMask::MOVED_FROM | WatchMask::DELETE)?;
        let buffer = vec![0u8; EVENT_BUFFER_SIZE].into_boxed_slice();
        // the stream owns the inotify instance, and with it the watch
        let events = inotify.into_event_stream(buffer)?;

        Ok(DirWatch {
            file_name: OsString::from(file_name),
            events,
        })
    }

    /// Waits for the next directory event, `true` if it moved or deleted the watched file
    pub async fn next(&mut self) -> io::Result<bool> {
        match self.events.next().await {
            Some(event) => Ok(is_gone(&event?, &self.file_name)),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "inotify event stream ended",
            )),
        }
    }
}

fn is_gone(event: &Event<OsString>, file_name: &OsStr) -> bool {
    event
        .mask
        .intersects(EventMask::MOVED_FROM | EventMask::DELETE)
        && event.name.as_deref() == Some(file_name)
}
