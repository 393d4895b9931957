use bytes::Bytes;
use frame::{Frame, Reason, StreamId};

/// Go away frame
///
/// Initiates shutdown of a connection. `last_stream_id` is the highest
/// numbered stream identifier the sender might have taken action on;
/// streams above it were not processed and may be retried elsewhere.
#[derive(Debug, Clone)]
pub struct GoAway {
    last_stream_id: StreamId,
    error_code: Reason,
    debug_data: Bytes,
}

impl GoAway {
    pub fn new(last_stream_id: StreamId, reason: Reason) -> GoAway {
        GoAway {
            last_stream_id: last_stream_id,
            error_code: reason,
            debug_data: Bytes::new(),
        }
    }

    pub fn with_debug_data(last_stream_id: StreamId, reason: Reason, debug_data: Bytes) -> GoAway {
        GoAway {
            last_stream_id: last_stream_id,
            error_code: reason,
            debug_data: debug_data,
        }
    }

    pub fn last_stream_id(&self) -> StreamId {
        self.last_stream_id
    }

    pub fn reason(&self) -> Reason {
        self.error_code
    }

    pub fn debug_data(&self) -> &Bytes {
        &self.debug_data
    }
}

impl From<GoAway> for Frame {
    fn from(src: GoAway) -> Frame {
        Frame::GoAway(src)
    }
}
