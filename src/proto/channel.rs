use {ConnectionError, RecvError, SendError};
use frame::{Frame, GoAway, StreamId};
use proto::{ChannelState, Key, WindowSize};
use proto::mux::{finish, run, Actions, Inner};

use futures::Sink;

use std::fmt;
use std::sync::{Arc, Mutex};

/// An application-facing handle to one stream's logical channel.
///
/// The handle serializes every operation through the multiplexer; it is
/// cheap to clone and may be held anywhere *except* inside this channel's
/// own handler callbacks, which receive a [`ChannelContext`] instead
/// (re-entering the handle from a callback would deadlock on the
/// multiplexer lock).
///
/// [`ChannelContext`]: struct.ChannelContext.html
pub struct StreamChannel<T> {
    inner: Arc<Mutex<Inner<T>>>,
    key: Key,
}

/// Channel operations available to a handler while one of its callbacks
/// runs.
///
/// Writes submitted through a context reach the parent sink when the
/// dispatch loop unwinds; errors the sink reports at that point are
/// delivered through [`StreamHandler::on_error`].
///
/// [`StreamHandler::on_error`]: trait.StreamHandler.html#method.on_error
pub struct ChannelContext<'a> {
    actions: &'a mut Actions,
    key: Key,
}

/// Per-stream application callbacks.
///
/// One handler instance is installed on each stream channel when the
/// channel is built. Callbacks run on the connection's thread.
pub trait StreamHandler {
    /// An inbound frame for this stream.
    fn on_frame(&mut self, ctx: &mut ChannelContext, frame: Frame);

    /// The current inbound batch is over. Fires at most once per batch,
    /// and only if this channel received at least one frame in it.
    fn on_read_complete(&mut self, _ctx: &mut ChannelContext) {}

    /// The outbound window crossed between zero and positive.
    fn on_writability_changed(&mut self, _ctx: &mut ChannelContext) {}

    /// The peer told this locally initiated stream to go away.
    fn on_go_away(&mut self, _ctx: &mut ChannelContext, _frame: GoAway) {}

    /// A stream-scoped error; the channel closes right after this call.
    fn on_error(&mut self, _ctx: &mut ChannelContext, _err: RecvError) {}

    /// The channel finished closing and left the registry.
    fn on_close(&mut self, _ctx: &mut ChannelContext) {}
}

// ===== impl StreamChannel =====

impl<T> StreamChannel<T>
where
    T: Sink<SinkItem = Frame, SinkError = ConnectionError>,
{
    pub(crate) fn new(inner: Arc<Mutex<Inner<T>>>, key: Key) -> StreamChannel<T> {
        StreamChannel {
            inner: inner,
            key: key,
        }
    }

    /// Submit a frame on this stream.
    ///
    /// Accepts stream frames with an unset binding (the channel's stream
    /// is bound before the frame goes out) and GOAWAY frames, which pass
    /// through untouched. The first frame on an unopened, locally
    /// initiated stream must be HEADERS and opens the stream. DATA larger
    /// than the current send window is refused.
    ///
    /// The write does not flush; call [`flush`] to push buffered frames to
    /// the transport.
    ///
    /// [`flush`]: #method.flush
    pub fn write(&mut self, frame: Frame) -> Result<(), SendError> {
        let mut me = self.inner.lock().unwrap();
        let me = &mut *me;

        me.actions.do_write(self.key, frame)?;
        run(me).map_err(SendError::Connection)
    }

    /// Flush the parent connection.
    pub fn flush(&mut self) -> Result<(), SendError> {
        let mut me = self.inner.lock().unwrap();
        let me = &mut *me;

        me.actions.request_flush();
        run(me).map_err(SendError::Connection)
    }

    /// Request a read when auto-read is disabled.
    ///
    /// Dispatches up to `max_messages_per_read` queued inbound frames to
    /// the handler.
    pub fn read(&mut self) {
        let mut me = self.inner.lock().unwrap();
        let me = &mut *me;

        me.actions.request_read(self.key);
        finish(me);
    }

    /// Close the channel.
    ///
    /// Unless the protocol already closed the stream, a RESET with CANCEL
    /// is written and flushed first. Closing twice is a no-op.
    pub fn close(&mut self) {
        let mut me = self.inner.lock().unwrap();
        let me = &mut *me;

        me.actions.close_channel(self.key);
        finish(me);
    }

    /// The application consumed `sz` bytes of inbound data; returns the
    /// window to the peer as a WINDOW_UPDATE on this stream (not flushed).
    pub fn consume_bytes(&mut self, sz: WindowSize) -> Result<(), SendError> {
        let mut me = self.inner.lock().unwrap();
        let me = &mut *me;

        me.actions.consume_bytes(self.key, sz)?;
        run(me).map_err(SendError::Connection)
    }

    /// The stream bound to this channel, once it has one.
    pub fn stream_id(&self) -> Option<StreamId> {
        self.inner.lock().unwrap().actions.stream_id(self.key)
    }

    /// True while the outbound window is positive.
    pub fn is_writable(&self) -> bool {
        self.inner.lock().unwrap().actions.is_writable(self.key)
    }

    /// The remaining outbound window.
    pub fn send_window(&self) -> WindowSize {
        self.inner.lock().unwrap().actions.send_window(self.key)
    }

    pub fn state(&self) -> ChannelState {
        self.inner.lock().unwrap().actions.state(self.key)
    }

    /// An attribute attached by the bootstrap.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.inner.lock().unwrap().actions.attr(self.key, name)
    }
}

impl<T> Clone for StreamChannel<T> {
    fn clone(&self) -> StreamChannel<T> {
        StreamChannel {
            inner: self.inner.clone(),
            key: self.key,
        }
    }
}

impl<T> fmt::Debug for StreamChannel<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("StreamChannel")
            .field("key", &self.key)
            .finish()
    }
}

// ===== impl ChannelContext =====

impl<'a> ChannelContext<'a> {
    pub(crate) fn new(actions: &'a mut Actions, key: Key) -> ChannelContext<'a> {
        ChannelContext {
            actions: actions,
            key: key,
        }
    }

    /// Submit a frame on this stream; see [`StreamChannel::write`].
    ///
    /// [`StreamChannel::write`]: struct.StreamChannel.html#method.write
    pub fn write(&mut self, frame: Frame) -> Result<(), SendError> {
        self.actions.do_write(self.key, frame)
    }

    /// Ask for a connection flush once the dispatch loop unwinds.
    pub fn flush(&mut self) {
        self.actions.request_flush();
    }

    /// Request a read when auto-read is disabled.
    pub fn read(&mut self) {
        self.actions.request_read(self.key);
    }

    /// Close the channel; see [`StreamChannel::close`].
    ///
    /// [`StreamChannel::close`]: struct.StreamChannel.html#method.close
    pub fn close(&mut self) {
        self.actions.close_channel(self.key);
    }

    /// Return consumed inbound window to the peer.
    pub fn consume_bytes(&mut self, sz: WindowSize) -> Result<(), SendError> {
        self.actions.consume_bytes(self.key, sz)
    }

    pub fn stream_id(&self) -> Option<StreamId> {
        self.actions.stream_id(self.key)
    }

    pub fn is_writable(&self) -> bool {
        self.actions.is_writable(self.key)
    }

    pub fn send_window(&self) -> WindowSize {
        self.actions.send_window(self.key)
    }

    pub fn state(&self) -> ChannelState {
        self.actions.state(self.key)
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.actions.attr(self.key, name)
    }
}

impl<'a> fmt::Debug for ChannelContext<'a> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("ChannelContext")
            .field("key", &self.key)
            .finish()
    }
}
