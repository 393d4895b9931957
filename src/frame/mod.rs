mod data;
mod go_away;
mod headers;
mod ping;
mod reason;
mod reset;
mod settings;
mod stream_id;
mod window_update;

pub use self::data::Data;
pub use self::go_away::GoAway;
pub use self::headers::{Headers, PushPromise, Pseudo};
pub use self::ping::Ping;
pub use self::reason::Reason;
pub use self::reset::Reset;
pub use self::settings::Settings;
pub use self::stream_id::StreamId;
pub use self::window_update::WindowUpdate;

/// A typed HTTP/2 frame.
///
/// `Data`, `Headers`, `PushPromise`, `Reset` and `WindowUpdate` are *stream
/// frames*: their semantics are scoped to a single stream and they carry a
/// stream binding, possibly unset ([`StreamId::zero`]). The remaining kinds
/// belong to the connection as a whole.
///
/// [`StreamId::zero`]: struct.StreamId.html#method.zero
#[derive(Debug, Clone)]
pub enum Frame {
    Data(Data),
    Headers(Headers),
    PushPromise(PushPromise),
    Reset(Reset),
    Settings(Settings),
    GoAway(GoAway),
    WindowUpdate(WindowUpdate),
    Ping(Ping),
}

// ===== impl Frame ======

impl Frame {
    /// The stream binding, if this is a stream frame.
    pub fn stream_id(&self) -> Option<StreamId> {
        use self::Frame::*;

        match *self {
            Data(ref v) => Some(v.stream_id()),
            Headers(ref v) => Some(v.stream_id()),
            PushPromise(ref v) => Some(v.stream_id()),
            Reset(ref v) => Some(v.stream_id()),
            WindowUpdate(ref v) => Some(v.stream_id()),
            Settings(..) | GoAway(..) | Ping(..) => None,
        }
    }

    /// Returns true if the frame is scoped to a single stream.
    pub fn is_stream_frame(&self) -> bool {
        self.stream_id().is_some()
    }

    /// Returns true if the frame ends the stream in its direction.
    pub fn is_end_stream(&self) -> bool {
        use self::Frame::*;

        match *self {
            Data(ref v) => v.is_end_stream(),
            Headers(ref v) => v.is_end_stream(),
            _ => false,
        }
    }

    pub(crate) fn is_headers(&self) -> bool {
        match *self {
            Frame::Headers(..) => true,
            _ => false,
        }
    }

    /// Bind a stream frame to a stream. No-op for connection frames.
    pub(crate) fn set_stream_id(&mut self, id: StreamId) {
        use self::Frame::*;

        match *self {
            Data(ref mut v) => v.set_stream_id(id),
            Headers(ref mut v) => v.set_stream_id(id),
            PushPromise(ref mut v) => v.set_stream_id(id),
            Reset(ref mut v) => v.set_stream_id(id),
            WindowUpdate(ref mut v) => v.set_stream_id(id),
            Settings(..) | GoAway(..) | Ping(..) => {}
        }
    }
}
