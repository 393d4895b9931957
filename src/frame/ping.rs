use bytes::Bytes;
use frame::Frame;

/// Ping frame
///
/// Pings belong to the connection, not to any stream; the multiplexer
/// passes them through untouched.
#[derive(Debug, Clone)]
pub struct Ping {
    ack: bool,
    payload: Bytes,
}

impl Ping {
    pub fn ping(payload: Bytes) -> Ping {
        Ping {
            ack: false,
            payload: payload,
        }
    }

    pub fn pong(payload: Bytes) -> Ping {
        Ping {
            ack: true,
            payload: payload,
        }
    }

    pub fn is_ack(&self) -> bool {
        self.ack
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}

impl From<Ping> for Frame {
    fn from(src: Ping) -> Frame {
        Frame::Ping(src)
    }
}
