//! Splits the input into records and feeds them to the queue.

use crate::error::ReadError;
use crate::queue::{Record, RecordSender};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

const DELIMITER: u8 = b'\n';

/// How the reader stopped without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadEnd {
    /// reached EOF, the queue was closed after the last record
    Eof { records: u64 },
    /// the writer stopped consuming, nothing more to do
    ConsumerGone { records: u64 },
}

/// Reads records until EOF and pushes them in order
///
/// A trailing chunk without a delimiter is pushed as its own record. Dropping `queue` on return
/// is what tells the writer the input ended.
pub async fn read_records<R>(mut input: R, queue: RecordSender) -> Result<ReadEnd, ReadError>
where
    R: AsyncBufRead + Unpin,
{
    let mut records = 0;
    loop {
        let mut line = Vec::new();
        let n = input.read_until(DELIMITER, &mut line).await?;
        if n == 0 {
            debug!(records, "end of input");
            queue.close();
            break Ok(ReadEnd::Eof { records });
        }
        if queue.push(Record::new(line)).await.is_err() {
            debug!(records, "queue consumer is gone, stop reading");
            break Ok(ReadEnd::ConsumerGone { records });
        }
        records += 1;
    }
}
