//! Bounded FIFO between the input reader and the writer.

use std::fmt;
use std::num::NonZeroUsize;
use tokio::sync::mpsc;

/// One line of input, including its `\n` unless it was the last chunk before EOF
#[derive(Clone, PartialEq, Eq)]
pub struct Record(Vec<u8>);

impl Record {
    pub fn new(bytes: Vec<u8>) -> Record {
        Record(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Record")
            .field(&String::from_utf8_lossy(&self.0))
            .finish()
    }
}

/// The consumer is gone, the record is handed back
#[derive(Debug)]
pub struct Closed(pub Record);

/// Producer side, dropping it ends the stream once the buffered records are consumed
pub struct RecordSender {
    tx: mpsc::Sender<Record>,
}

/// Consumer side
pub struct RecordReceiver {
    rx: mpsc::Receiver<Record>,
}

/// Creates a queue holding up to `capacity` unconsumed records
pub fn bounded(capacity: NonZeroUsize) -> (RecordSender, RecordReceiver) {
    let (tx, rx) = mpsc::channel(capacity.get());
    (RecordSender { tx }, RecordReceiver { rx })
}

impl RecordSender {
    /// Waits while the queue is full
    pub async fn push(&self, record: Record) -> Result<(), Closed> {
        self.tx
            .send(record)
            .await
            .map_err(|mpsc::error::SendError(record)| Closed(record))
    }

    /// ends the stream, records already queued are still delivered
    pub fn close(self) {}
}

impl RecordReceiver {
    /// Waits while the queue is empty, `None` once the producer closed and everything was popped
    pub async fn pop(&mut self) -> Option<Record> {
        self.rx.recv().await
    }

    /// stops accepting records, already queued ones can still be popped
    pub fn close(&mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn record(bytes: &[u8]) -> Record {
        Record::new(bytes.to_vec())
    }

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[tokio::test]
    async fn full_queue_blocks_the_producer() {
        let (tx, mut rx) = bounded(capacity(2));
        tx.push(record(b"1\n")).await.unwrap();
        tx.push(record(b"2\n")).await.unwrap();

        let blocked = timeout(Duration::from_millis(50), tx.push(record(b"3\n"))).await;
        assert!(blocked.is_err(), "push into a full queue returned");

        assert_eq!(rx.pop().await, Some(record(b"1\n")));
        timeout(Duration::from_secs(5), tx.push(record(b"3\n")))
            .await
            .expect("push still blocked after a pop")
            .unwrap();

        assert_eq!(rx.pop().await, Some(record(b"2\n")));
        assert_eq!(rx.pop().await, Some(record(b"3\n")));
    }

    #[tokio::test]
    async fn close_delivers_buffered_records() {
        let (tx, mut rx) = bounded(capacity(4));
        tx.push(record(b"a\n")).await.unwrap();
        tx.push(record(b"b")).await.unwrap();
        tx.close();

        assert_eq!(rx.pop().await, Some(record(b"a\n")));
        assert_eq!(rx.pop().await, Some(record(b"b")));
        assert_eq!(rx.pop().await, None);
    }

    #[tokio::test]
    async fn push_after_consumer_is_gone_returns_the_record() {
        let (tx, rx) = bounded(capacity(1));
        drop(rx);

        let Closed(returned) = tx.push(record(b"lost\n")).await.unwrap_err();
        assert_eq!(returned, record(b"lost\n"));
    }
}
