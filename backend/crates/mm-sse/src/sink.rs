use crate::Result as SseResult;

use bytes::Bytes;

/// Write side of one client's push transport.
///
/// `write` must not block: a transport that cannot take the frame right
/// now reports failure immediately, and the manager evicts that client.
/// `close` may fail on an already-closed transport; callers ignore it.
pub trait Sink: Send + Sync {
    fn write(&self, frame: Bytes) -> SseResult<()>;

    fn close(&self) -> SseResult<()>;
}
