//! An HTTP/2 stream multiplexer.
//!
//! This crate sits on top of a single HTTP/2 framing connection and presents
//! each HTTP/2 stream as an independent, bidirectional logical channel. The
//! framing layer (the "parent") delivers typed frames and stream lifecycle
//! events into a [`Multiplexer`]; the multiplexer demultiplexes them by
//! stream identifier onto per-stream channels, each of which runs an
//! application-provided [`StreamHandler`]. Outbound, every channel funnels
//! its frames back through the multiplexer onto the parent connection.
//!
//! # Scope
//!
//! The crate deliberately does not parse or serialize wire bytes, perform
//! HPACK, establish connections, or manage connection-level flow control.
//! Those concerns belong to the framing layer, which interacts with this
//! crate through two seams:
//!
//! * **inbound**: [`Multiplexer::recv_frame`], [`Multiplexer::stream_active`],
//!   [`Multiplexer::stream_closed`], [`Multiplexer::recv_error`] and
//!   [`Multiplexer::read_complete`];
//! * **outbound**: any `futures::Sink` of [`Frame`] values. `start_send`
//!   models a write, `poll_complete` a flush.
//!
//! Frames the multiplexer does not own (PING, connection-scope
//! WINDOW_UPDATE) are handed back to the caller untouched.
//!
//! # Stream binding
//!
//! A frame scoped to a stream carries a stream identifier. Applications
//! submit such frames with [`StreamId::zero`], the unset binding, and the
//! multiplexer binds the channel's actual stream exactly once before the
//! frame reaches the parent. Submitting a frame whose identifier is already
//! set is an error, as is opening a locally initiated stream with anything
//! other than a HEADERS frame.
//!
//! [`Multiplexer`]: struct.Multiplexer.html
//! [`Multiplexer::recv_frame`]: struct.Multiplexer.html#method.recv_frame
//! [`Multiplexer::stream_active`]: struct.Multiplexer.html#method.stream_active
//! [`Multiplexer::stream_closed`]: struct.Multiplexer.html#method.stream_closed
//! [`Multiplexer::recv_error`]: struct.Multiplexer.html#method.recv_error
//! [`Multiplexer::read_complete`]: struct.Multiplexer.html#method.read_complete
//! [`StreamHandler`]: trait.StreamHandler.html
//! [`Frame`]: frame/enum.Frame.html
//! [`StreamId::zero`]: frame/struct.StreamId.html#method.zero

#[macro_use]
extern crate log;
extern crate bytes;
extern crate futures;
extern crate http;
extern crate slab;

pub mod frame;

mod bootstrap;
mod error;
mod proto;

pub use bootstrap::Bootstrap;
pub use error::{ConnectionError, RecvError, SendError, UserError};
pub use frame::{Frame, Reason, StreamId};
pub use proto::{ChannelContext, ChannelState, Client, Config, Multiplexer, Peer, Server,
                StreamChannel, StreamHandler, WindowSize};
pub use proto::{DEFAULT_INITIAL_WINDOW_SIZE, MAX_WINDOW_SIZE};
