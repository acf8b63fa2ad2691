use crate::{Result as SseResult, Sink, SseError};

use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Sink backed by a bounded channel whose receiver feeds the HTTP body.
///
/// A full buffer (slow client) or a dropped receiver (client gone) fails
/// the write immediately. Closing drops the sender, which ends the body
/// stream once buffered frames drain.
pub struct ChannelSink {
    sender: Mutex<Option<mpsc::Sender<Bytes>>>,
}

impl ChannelSink {
    pub fn new(buffer_size: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        (
            Self {
                sender: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_none_or(|tx| tx.is_closed())
    }
}

impl Sink for ChannelSink {
    fn write(&self, frame: Bytes) -> SseResult<()> {
        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = guard.as_ref().ok_or_else(|| SseError::sink_closed())?;

        tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => SseError::send_buffer_full(),
            TrySendError::Closed(_) => SseError::sink_closed(),
        })
    }

    fn close(&self) -> SseResult<()> {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .map(drop)
            .ok_or_else(|| SseError::sink_closed())
    }
}
