use bytes::Bytes;
use frame::{Frame, StreamId};

/// Data frame
///
/// Data frames convey arbitrary, variable-length sequences of octets
/// associated with a stream.
#[derive(Debug, Clone)]
pub struct Data {
    stream_id: StreamId,
    data: Bytes,
    end_stream: bool,
}

impl Data {
    pub fn new(stream_id: StreamId, data: Bytes, end_stream: bool) -> Data {
        Data {
            stream_id: stream_id,
            data: data,
            end_stream: end_stream,
        }
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub(crate) fn set_stream_id(&mut self, stream_id: StreamId) {
        self.stream_id = stream_id;
    }

    pub fn is_end_stream(&self) -> bool {
        self.end_stream
    }

    pub fn payload(&self) -> &Bytes {
        &self.data
    }

    pub fn into_payload(self) -> Bytes {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

impl From<Data> for Frame {
    fn from(src: Data) -> Frame {
        Frame::Data(src)
    }
}
