use frame::{Frame, StreamId};

/// Window update frame
///
/// Informs the peer that `size_increment` octets of flow-control window are
/// available again, either on a single stream or, with the zero stream id,
/// on the connection as a whole.
#[derive(Debug, Clone, Copy)]
pub struct WindowUpdate {
    stream_id: StreamId,
    size_increment: u32,
}

impl WindowUpdate {
    pub fn new(stream_id: StreamId, size_increment: u32) -> WindowUpdate {
        WindowUpdate {
            stream_id: stream_id,
            size_increment: size_increment,
        }
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub(crate) fn set_stream_id(&mut self, stream_id: StreamId) {
        self.stream_id = stream_id;
    }

    pub fn size_increment(&self) -> u32 {
        self.size_increment
    }
}

impl From<WindowUpdate> for Frame {
    fn from(src: WindowUpdate) -> Frame {
        Frame::WindowUpdate(src)
    }
}
