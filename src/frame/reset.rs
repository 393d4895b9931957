use frame::{Frame, Reason, StreamId};

/// Reset frame
///
/// Allows for immediate termination of a stream.
#[derive(Debug, Clone, Copy)]
pub struct Reset {
    stream_id: StreamId,
    error_code: Reason,
}

impl Reset {
    pub fn new(stream_id: StreamId, error: Reason) -> Reset {
        Reset {
            stream_id: stream_id,
            error_code: error,
        }
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub(crate) fn set_stream_id(&mut self, stream_id: StreamId) {
        self.stream_id = stream_id;
    }

    pub fn reason(&self) -> Reason {
        self.error_code
    }
}

impl From<Reset> for Frame {
    fn from(src: Reset) -> Frame {
        Frame::Reset(src)
    }
}
