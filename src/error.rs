use frame::{Reason, StreamId};

use std::{error, fmt, io};

/// Errors that prevent the connection from making further progress.
///
/// This is the error type of the parent framing sink.
#[derive(Debug)]
pub enum ConnectionError {
    /// An error caused by an action taken by the remote peer.
    Proto(Reason),

    /// An error resulting from an invalid action taken by the transport.
    Io(io::Error),
}

/// Errors caused by the peer or the transport, delivered with inbound
/// traffic.
///
/// A `Stream` error is scoped to a single stream; the multiplexer routes it
/// to the owning channel without disturbing its siblings. The other variants
/// poison the connection and are handed back to the parent pipeline.
#[derive(Debug)]
pub enum RecvError {
    Connection(Reason),
    Stream { id: StreamId, reason: Reason },
    Io(io::Error),
}

/// Errors caused by sending a message on a stream channel.
#[derive(Debug)]
pub enum SendError {
    Connection(ConnectionError),
    User(UserError),
}

/// Errors caused by the application misusing a stream channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserError {
    /// The first frame written on an unopened stream was not a HEADERS frame.
    FirstFrameMustBeHeaders,

    /// The message was neither a stream frame nor a GOAWAY frame.
    UnexpectedFrameType,

    /// The submitted frame already carried a stream identifier.
    StreamIdAlreadySet,

    /// The channel is closed.
    InactiveStream,

    /// The frame does not fit in the stream's send window.
    FlowControlViolation,
}

// ===== impl ConnectionError =====

impl From<io::Error> for ConnectionError {
    fn from(src: io::Error) -> ConnectionError {
        ConnectionError::Io(src)
    }
}

impl From<Reason> for ConnectionError {
    fn from(src: Reason) -> ConnectionError {
        ConnectionError::Proto(src)
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConnectionError::Proto(reason) => write!(fmt, "protocol error: {}", reason),
            ConnectionError::Io(ref e) => fmt::Display::fmt(e, fmt),
        }
    }
}

impl error::Error for ConnectionError {
    fn description(&self) -> &str {
        match *self {
            ConnectionError::Proto(reason) => reason.description(),
            ConnectionError::Io(ref e) => error::Error::description(e),
        }
    }
}

// ===== impl RecvError =====

impl From<ConnectionError> for RecvError {
    fn from(src: ConnectionError) -> RecvError {
        match src {
            ConnectionError::Proto(reason) => RecvError::Connection(reason),
            ConnectionError::Io(e) => RecvError::Io(e),
        }
    }
}

impl fmt::Display for RecvError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RecvError::Connection(reason) => write!(fmt, "protocol error: {}", reason),
            RecvError::Stream { id, reason } => {
                write!(fmt, "stream error on stream {:?}: {}", id, reason)
            }
            RecvError::Io(ref e) => fmt::Display::fmt(e, fmt),
        }
    }
}

impl error::Error for RecvError {
    fn description(&self) -> &str {
        match *self {
            RecvError::Connection(reason) | RecvError::Stream { reason, .. } => {
                reason.description()
            }
            RecvError::Io(ref e) => error::Error::description(e),
        }
    }
}

// ===== impl SendError =====

impl From<ConnectionError> for SendError {
    fn from(src: ConnectionError) -> SendError {
        SendError::Connection(src)
    }
}

impl From<UserError> for SendError {
    fn from(src: UserError) -> SendError {
        SendError::User(src)
    }
}

impl fmt::Display for SendError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SendError::Connection(ref e) => fmt::Display::fmt(e, fmt),
            SendError::User(e) => fmt::Display::fmt(&e, fmt),
        }
    }
}

impl error::Error for SendError {
    fn description(&self) -> &str {
        match *self {
            SendError::Connection(ref e) => error::Error::description(e),
            SendError::User(ref e) => error::Error::description(e),
        }
    }
}

// ===== impl UserError =====

impl fmt::Display for UserError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(error::Error::description(self))
    }
}

impl error::Error for UserError {
    fn description(&self) -> &str {
        use self::UserError::*;

        match *self {
            FirstFrameMustBeHeaders => "first frame must be a HEADERS frame",
            UnexpectedFrameType => "message must be an HTTP/2 stream frame or a GOAWAY frame",
            StreamIdAlreadySet => "stream must not be set on the frame",
            InactiveStream => "stream is no longer active",
            FlowControlViolation => "frame exceeds the stream send window",
        }
    }
}
