use {Bootstrap, ConnectionError, RecvError, SendError, UserError};
use frame::{self, Frame, Reason, Reset, Settings, StreamId, WindowUpdate};
use proto::{ChannelState, Key, ReadItem, Store, Stream, WindowSize};
use proto::DEFAULT_INITIAL_WINDOW_SIZE;
use proto::channel::{ChannelContext, StreamChannel, StreamHandler};
use proto::peer::Peer;

use futures::{Async, AsyncSink, Poll, Sink};

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::mem;
use std::sync::{Arc, Mutex};
use std::thread;

/// Demultiplexes one HTTP/2 connection's frames onto per-stream logical
/// channels.
///
/// The parent framing layer pushes typed frames and stream lifecycle events
/// in through [`recv_frame`], [`stream_active`], [`stream_closed`],
/// [`recv_error`] and [`read_complete`]; the multiplexer routes them to the
/// owning stream channel and runs that channel's [`StreamHandler`].
/// Outbound, every channel's frames are serialized onto the parent sink in
/// submission order. Writes never flush by themselves; [`poll_flush`] (or a
/// channel-level flush) drives the parent's `poll_complete`.
///
/// All upstream calls must stay on the connection's thread. Channel handles
/// may live anywhere, but must not be used from inside handler callbacks;
/// callbacks get a [`ChannelContext`] instead.
///
/// [`recv_frame`]: #method.recv_frame
/// [`stream_active`]: #method.stream_active
/// [`stream_closed`]: #method.stream_closed
/// [`recv_error`]: #method.recv_error
/// [`read_complete`]: #method.read_complete
/// [`poll_flush`]: #method.poll_flush
/// [`StreamHandler`]: trait.StreamHandler.html
/// [`ChannelContext`]: struct.ChannelContext.html
pub struct Multiplexer<T, P> {
    inner: Arc<Mutex<Inner<T>>>,
    _p: PhantomData<P>,
}

/// Multiplexer configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The window credited to a stream when it becomes active. The peer's
    /// SETTINGS overrides this for streams activated afterwards.
    pub initial_window_size: WindowSize,
}

pub(crate) struct Inner<T> {
    /// The parent framing context; every outbound frame funnels into it.
    pub(crate) sink: T,
    pub(crate) actions: Actions,
}

/// All multiplexer state except the parent sink.
///
/// Split out so channel callbacks can borrow it while the sink stays
/// untouched; frames written from inside a callback park on `pending_send`
/// and reach the sink once the dispatch loop unwinds.
pub(crate) struct Actions {
    /// Registered stream channels
    store: Store,

    /// Channels that received at least one frame in the current read batch
    read_batch: VecDeque<Key>,

    /// Child events waiting for dispatch
    events: VecDeque<(Key, ChildEvent)>,

    /// Outbound frames accepted from children but not yet taken by the sink
    pending_send: VecDeque<PendingSend>,

    /// True while the dispatch loop runs
    dispatching: bool,

    /// A child asked for a flush
    flush_requested: bool,

    /// Window credited to newly activated streams
    init_window_sz: WindowSize,

    /// True when running in the context of an HTTP/2 server
    is_server: bool,

    /// The id handed to the next locally initiated stream
    next_local_id: StreamId,

    /// Builds the channel for streams the multiplexer discovers
    bootstrap: Bootstrap,

    /// The connection's thread; the upstream interface must stay on it
    loop_thread: thread::ThreadId,
}

struct PendingSend {
    frame: Frame,

    /// Channel whose activation is tied to this write
    listener: Option<Key>,
}

pub(crate) enum ChildEvent {
    DispatchReads,
    ReadComplete,
    WritabilityChanged,
    GoAway(frame::GoAway),
    Error(RecvError),
    Closed,
}

// ===== impl Multiplexer =====

impl<T, P> Multiplexer<T, P>
where
    T: Sink<SinkItem = Frame, SinkError = ConnectionError>,
    P: Peer,
{
    /// Attach a multiplexer to the parent framing sink.
    ///
    /// The bootstrap builds the logical channel of every stream the peer
    /// initiates (and of [`new_stream`] calls); `config` seeds the default
    /// stream window.
    ///
    /// [`new_stream`]: #method.new_stream
    pub fn new(sink: T, bootstrap: Bootstrap, config: Config) -> Multiplexer<T, P> {
        let actions = Actions {
            store: Store::new(),
            read_batch: VecDeque::new(),
            events: VecDeque::new(),
            pending_send: VecDeque::new(),
            dispatching: false,
            flush_requested: false,
            init_window_sz: config.initial_window_size,
            is_server: P::is_server(),
            next_local_id: P::first_local_id(),
            bootstrap: bootstrap,
            loop_thread: thread::current().id(),
        };

        Multiplexer {
            inner: Arc::new(Mutex::new(Inner {
                sink: sink,
                actions: actions,
            })),
            _p: PhantomData,
        }
    }

    /// Deliver an inbound frame.
    ///
    /// Stream frames are routed to the owning channel, GOAWAY is fanned out
    /// to the affected children and SETTINGS updates the default stream
    /// window; all three are consumed. Frames the multiplexer does not own
    /// (PING, connection-scope WINDOW_UPDATE) are handed back for the
    /// caller to forward upstream.
    pub fn recv_frame(&mut self, frame: Frame) -> Result<Option<Frame>, RecvError> {
        let mut me = self.inner.lock().unwrap();
        let me = &mut *me;
        me.actions.assert_loop();

        let ret = match frame {
            Frame::GoAway(frame) => {
                me.actions.recv_go_away(frame);
                Ok(None)
            }
            Frame::Settings(frame) => {
                me.actions.recv_settings(&frame);
                Ok(None)
            }
            frame => {
                match frame.stream_id() {
                    Some(id) => {
                        if id.is_zero() {
                            if let Frame::WindowUpdate(..) = frame {
                                // Connection-level flow control belongs to
                                // the framer
                                Ok(Some(frame))
                            } else {
                                debug!("stream frame on the connection stream");
                                Err(RecvError::Connection(Reason::ProtocolError))
                            }
                        } else {
                            me.actions.recv_stream_frame(id, frame);
                            Ok(None)
                        }
                    }
                    // PING and other connection frames pass through
                    None => Ok(Some(frame)),
                }
            }
        };

        if let Err(e) = run(me) {
            return match ret {
                Err(err) => Err(err),
                Ok(_) => Err(e.into()),
            };
        }

        ret
    }

    /// A stream transitioned to active.
    ///
    /// Registers the channel (constructing it through the bootstrap if the
    /// stream is new), credits the stream window and fires
    /// writability-changed on the child. Redelivery for an already active
    /// stream is a no-op apart from returning the existing channel.
    pub fn stream_active(&mut self, id: StreamId) -> StreamChannel<T> {
        debug_assert!(!id.is_zero());

        let key = {
            let mut me = self.inner.lock().unwrap();
            let me = &mut *me;
            me.actions.assert_loop();

            trace!("stream active; id={:?}", id);
            let key = me.actions.activate_stream(id);
            finish(me);
            key
        };

        StreamChannel::new(self.inner.clone(), key)
    }

    /// A stream transitioned to closed.
    ///
    /// Enqueues the end-of-stream marker on the channel's read queue. The
    /// channel leaves the registry once the application drains the queue;
    /// no RESET is emitted for this kind of close.
    pub fn stream_closed(&mut self, id: StreamId) {
        let mut me = self.inner.lock().unwrap();
        let me = &mut *me;
        me.actions.assert_loop();

        me.actions.recv_stream_closed(id);
        finish(me);
    }

    /// Route an inbound error.
    ///
    /// Stream-scoped errors fire on the owning channel, which then closes;
    /// its siblings are untouched and `Ok` is returned. Connection-scoped
    /// errors are handed back for the parent pipeline.
    pub fn recv_error(&mut self, err: RecvError) -> Result<(), RecvError> {
        let mut me = self.inner.lock().unwrap();
        let me = &mut *me;
        me.actions.assert_loop();

        let ret = match err {
            RecvError::Stream { id, .. } => {
                me.actions.recv_stream_error(id, err);
                Ok(())
            }
            err => Err(err),
        };

        if let Err(e) = run(me) {
            return match ret {
                Err(err) => Err(err),
                Ok(()) => Err(e.into()),
            };
        }

        ret
    }

    /// The current inbound batch is over.
    ///
    /// Fires read-complete once on every channel that received at least one
    /// frame since the previous batch ended.
    pub fn read_complete(&mut self) {
        let mut me = self.inner.lock().unwrap();
        let me = &mut *me;
        me.actions.assert_loop();

        let batch = mem::replace(&mut me.actions.read_batch, VecDeque::new());
        for key in batch {
            me.actions.events.push_back((key, ChildEvent::ReadComplete));
        }
        finish(me);
    }

    /// Flush the parent connection.
    ///
    /// Drains frames parked on sink backpressure, then drives the parent's
    /// `poll_complete`.
    pub fn poll_flush(&mut self) -> Poll<(), ConnectionError> {
        let mut me = self.inner.lock().unwrap();
        let me = &mut *me;
        me.actions.assert_loop();

        run(me)?;

        if !me.actions.pending_send.is_empty() {
            return Ok(Async::NotReady);
        }

        me.sink.poll_complete()
    }

    /// Create a channel for a locally initiated stream.
    ///
    /// The stream has no identifier yet; the first HEADERS write opens it
    /// and assigns the next locally initiated id. The channel's handler
    /// comes from the bootstrap.
    pub fn new_stream(&mut self) -> StreamChannel<T> {
        let key = {
            let mut me = self.inner.lock().unwrap();
            me.actions.new_child(None)
        };

        StreamChannel::new(self.inner.clone(), key)
    }

    /// Like [`new_stream`], with a handler replacing the bootstrap's.
    ///
    /// [`new_stream`]: #method.new_stream
    pub fn new_stream_with_handler(&mut self, handler: Box<StreamHandler>) -> StreamChannel<T> {
        let key = {
            let mut me = self.inner.lock().unwrap();
            me.actions.new_child(Some(handler))
        };

        StreamChannel::new(self.inner.clone(), key)
    }

    /// Look up the channel bound to a stream.
    pub fn channel(&self, id: StreamId) -> Option<StreamChannel<T>> {
        let key = {
            let me = self.inner.lock().unwrap();
            match me.actions.store.find_key(id) {
                Some(key) => key,
                None => return None,
            }
        };

        Some(StreamChannel::new(self.inner.clone(), key))
    }

    /// The number of streams whose channels have not completed close.
    pub fn num_active_streams(&self) -> usize {
        let me = self.inner.lock().unwrap();
        me.actions.store.num_bound()
    }
}

impl<T, P> fmt::Debug for Multiplexer<T, P> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Multiplexer").finish()
    }
}

// ===== impl Config =====

impl Default for Config {
    fn default() -> Config {
        Config {
            initial_window_size: DEFAULT_INITIAL_WINDOW_SIZE,
        }
    }
}

// ===== impl Actions =====

impl Actions {
    fn assert_loop(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.loop_thread,
            "multiplexer driven off its connection thread"
        );
    }

    /// Build a channel through the bootstrap, or around the given handler.
    pub(crate) fn new_child(&mut self, handler: Option<Box<StreamHandler>>) -> Key {
        let handler = match handler {
            Some(handler) => handler,
            None => self.bootstrap.build_handler(),
        };

        let mut stream = Stream::new(handler);
        self.bootstrap.apply(&mut stream);
        self.store.insert(stream)
    }

    /// Register (or find) the channel for `id` and apply the activation
    /// credit exactly once.
    pub(crate) fn activate_stream(&mut self, id: StreamId) -> Key {
        let key = match self.store.find_key(id) {
            Some(key) => key,
            None => {
                let key = self.new_child(None);
                self.store.bind(id, key);
                self.store[key].id = id;
                key
            }
        };

        self.complete_activation(key);
        key
    }

    /// The activation path: credit the window, then tell the child its
    /// writability changed. Guarded so redelivery cannot double-credit.
    fn complete_activation(&mut self, key: Key) {
        let init_window_sz = self.init_window_sz;

        let fire = {
            let stream = match self.store.get_mut(key) {
                Some(stream) => stream,
                None => return,
            };

            if stream.activated {
                false
            } else {
                stream.activated = true;
                stream.open();
                stream.send_flow.assign_capacity(init_window_sz);
                true
            }
        };

        if fire {
            self.events.push_back((key, ChildEvent::WritabilityChanged));
        }
    }

    pub(crate) fn recv_stream_frame(&mut self, id: StreamId, frame: Frame) {
        debug_assert_eq!(Some(id), frame.stream_id());

        let key = match self.store.find_key(id) {
            Some(key) => key,
            None => {
                // The framer normally announces the stream first
                trace!("frame for unregistered stream; activating; id={:?}", id);
                self.activate_stream(id)
            }
        };

        if self.store[key].state == ChannelState::Closed {
            trace!("dropping frame for closed channel; id={:?}", id);
            return;
        }

        // An inbound WINDOW_UPDATE also expands the channel's send window
        if let Frame::WindowUpdate(ref v) = frame {
            self.expand_send_window(key, v.size_increment());
        }

        let stream = &mut self.store[key];

        if frame.is_end_stream() {
            stream.recv_eos();
        }

        trace!("recv frame; id={:?}", id);
        stream.read_queue.push_back(ReadItem::Frame(frame));

        if !stream.in_read_complete_batch {
            stream.in_read_complete_batch = true;
            self.read_batch.push_back(key);
        }

        if stream.auto_read || stream.read_requested {
            self.events.push_back((key, ChildEvent::DispatchReads));
        }
    }

    pub(crate) fn recv_go_away(&mut self, frame: frame::GoAway) {
        let last = frame.last_stream_id();
        trace!("recv GOAWAY; last_stream_id={:?}", last);

        let is_server = self.is_server;
        let events = &mut self.events;

        self.store.for_each(|key, stream| {
            if stream.id <= last {
                return;
            }

            // Only locally initiated streams are affected
            if stream.id.is_server_initiated() != is_server {
                return;
            }

            if stream.state == ChannelState::Closed {
                return;
            }

            trace!("notifying child of GOAWAY; id={:?}", stream.id);
            // each recipient owns its own copy of the frame
            events.push_back((key, ChildEvent::GoAway(frame.clone())));
        });

        // the source frame drops here, once, after the fan-out
    }

    pub(crate) fn recv_settings(&mut self, frame: &Settings) {
        if let Some(sz) = frame.initial_window_size() {
            // Applies to future activations; live streams keep their window
            debug!("initial stream window is now {}", sz);
            self.init_window_sz = sz;
        }
    }

    pub(crate) fn recv_stream_closed(&mut self, id: StreamId) {
        let key = match self.store.find_key(id) {
            Some(key) => key,
            None => {
                trace!("CLOSED for unknown stream; id={:?}", id);
                return;
            }
        };

        let stream = &mut self.store[key];

        if stream.state == ChannelState::Closed {
            return;
        }

        trace!("stream closed by protocol; id={:?}", id);
        stream.stream_closed_without_error = true;
        stream.read_queue.push_back(ReadItem::Eos);

        if stream.auto_read || stream.read_requested {
            self.events.push_back((key, ChildEvent::DispatchReads));
        }
    }

    pub(crate) fn recv_stream_error(&mut self, id: StreamId, err: RecvError) {
        match self.store.find_key(id) {
            Some(key) => {
                debug!("stream error; id={:?}", id);
                self.events.push_back((key, ChildEvent::Error(err)));
                self.close_channel(key);
            }
            None => {
                // the stream is already gone; nothing to notify
                trace!("error for unknown stream; id={:?}", id);
            }
        }
    }

    /// Accept an outbound frame from a channel.
    ///
    /// Enforces the write contract and binds the frame to the channel's
    /// stream. The frame is dropped, releasing its payload, on every
    /// rejection path. Accepted frames park on the pending queue until the
    /// sink takes them; no flush is implied.
    pub(crate) fn do_write(&mut self, key: Key, frame: Frame) -> Result<(), SendError> {
        {
            let stream = match self.store.get(key) {
                Some(stream) => stream,
                None => return Err(UserError::InactiveStream.into()),
            };

            if stream.state == ChannelState::Closed {
                return Err(UserError::InactiveStream.into());
            }
        }

        // GOAWAY is a connection frame; the binding rules do not apply
        if let Frame::GoAway(..) = frame {
            trace!("child write GOAWAY");
            self.pending_send.push_back(PendingSend {
                frame: frame,
                listener: None,
            });
            return Ok(());
        }

        let id = match frame.stream_id() {
            Some(id) => id,
            None => return Err(UserError::UnexpectedFrameType.into()),
        };

        if !id.is_zero() {
            return Err(UserError::StreamIdAlreadySet.into());
        }

        let mut frame = frame;
        let bound_id;
        let listener;
        let mut became_unwritable = false;

        {
            let stream = &mut self.store[key];

            // A locally initiated stream must open with HEADERS
            if stream.id.is_zero() && !frame.is_headers() {
                return Err(UserError::FirstFrameMustBeHeaders.into());
            }

            if let Frame::Data(ref v) = frame {
                let sz = v.len() as WindowSize;
                let was_writable = stream.send_flow.is_writable();
                stream
                    .send_flow
                    .claim_capacity(sz, UserError::FlowControlViolation)?;
                became_unwritable = was_writable && !stream.send_flow.is_writable();
            }

            listener = if stream.activated { None } else { Some(key) };
            stream.first_frame_written = true;

            if frame.is_end_stream() {
                stream.send_eos();
            }

            bound_id = stream.id;
        }

        let bound_id = if bound_id.is_zero() {
            let id = self.next_local_id;
            self.next_local_id = id.next_initiated();
            self.store.bind(id, key);
            self.store[key].id = id;
            trace!("opening local stream; id={:?}", id);
            id
        } else {
            bound_id
        };

        frame.set_stream_id(bound_id);

        if became_unwritable {
            self.events.push_back((key, ChildEvent::WritabilityChanged));
        }

        trace!("child write; id={:?}", bound_id);
        self.pending_send.push_back(PendingSend {
            frame: frame,
            listener: listener,
        });

        Ok(())
    }

    /// The application consumed `sz` bytes of inbound data; give the window
    /// back to the peer. No flush is implied.
    pub(crate) fn consume_bytes(&mut self, key: Key, sz: WindowSize) -> Result<(), SendError> {
        let id = {
            let stream = match self.store.get(key) {
                Some(stream) => stream,
                None => return Err(UserError::InactiveStream.into()),
            };

            if stream.state == ChannelState::Closed || stream.id.is_zero() {
                return Err(UserError::InactiveStream.into());
            }

            stream.id
        };

        if sz == 0 {
            return Ok(());
        }

        trace!("consumed {} bytes; id={:?}", sz, id);
        self.pending_send.push_back(PendingSend {
            frame: WindowUpdate::new(id, sz).into(),
            listener: None,
        });

        Ok(())
    }

    pub(crate) fn request_read(&mut self, key: Key) {
        {
            let stream = match self.store.get_mut(key) {
                Some(stream) => stream,
                None => return,
            };

            if stream.state == ChannelState::Closed {
                return;
            }

            stream.read_requested = true;
        }

        self.events.push_back((key, ChildEvent::DispatchReads));
    }

    pub(crate) fn request_flush(&mut self) {
        self.flush_requested = true;
    }

    /// Close a channel.
    ///
    /// Unless the protocol already closed the stream, a RESET with CANCEL
    /// goes out (and is flushed) before the channel finishes closing.
    /// Calling this twice is a no-op.
    pub(crate) fn close_channel(&mut self, key: Key) {
        let (id, send_reset) = {
            let stream = match self.store.get_mut(key) {
                Some(stream) => stream,
                None => return,
            };

            if stream.state == ChannelState::Closed {
                return;
            }

            stream.state = ChannelState::Closed;

            let send_reset = !stream.stream_closed_without_error && !stream.id.is_zero();
            (stream.id, send_reset)
        };

        if send_reset {
            trace!("closing with CANCEL; id={:?}", id);
            self.pending_send.push_back(PendingSend {
                frame: Reset::new(id, Reason::Cancel).into(),
                listener: None,
            });
            self.flush_requested = true;
        }

        self.events.push_back((key, ChildEvent::Closed));
    }

    fn expand_send_window(&mut self, key: Key, sz: WindowSize) {
        let fire = {
            let stream = &mut self.store[key];
            let was_writable = stream.send_flow.is_writable();
            stream.send_flow.assign_capacity(sz);
            !was_writable && stream.send_flow.is_writable()
        };

        if fire {
            self.events.push_back((key, ChildEvent::WritabilityChanged));
        }
    }

    // ===== accessors used by channel handles and contexts =====

    pub(crate) fn stream_id(&self, key: Key) -> Option<StreamId> {
        self.store.get(key).and_then(|stream| {
            if stream.id.is_zero() {
                None
            } else {
                Some(stream.id)
            }
        })
    }

    pub(crate) fn is_writable(&self, key: Key) -> bool {
        self.store
            .get(key)
            .map(|stream| stream.send_flow.is_writable())
            .unwrap_or(false)
    }

    pub(crate) fn send_window(&self, key: Key) -> WindowSize {
        self.store
            .get(key)
            .map(|stream| stream.send_flow.available())
            .unwrap_or(0)
    }

    pub(crate) fn state(&self, key: Key) -> ChannelState {
        self.store
            .get(key)
            .map(|stream| stream.state)
            .unwrap_or(ChannelState::Closed)
    }

    pub(crate) fn attr(&self, key: Key, name: &str) -> Option<String> {
        self.store
            .get(key)
            .and_then(|stream| stream.attrs.get(name).cloned())
    }

    // ===== event dispatch =====

    pub(crate) fn drain_events(&mut self) {
        if self.dispatching {
            return;
        }

        self.dispatching = true;
        while let Some((key, event)) = self.events.pop_front() {
            self.dispatch_event(key, event);
        }
        self.dispatching = false;
    }

    fn dispatch_event(&mut self, key: Key, event: ChildEvent) {
        // Take the handler for the duration of the callback; the dispatch
        // loop is not re-entered, so it cannot be observed missing.
        let mut handler = match self.store.get_mut(key).and_then(|s| s.handler.take()) {
            Some(handler) => handler,
            None => return,
        };

        match event {
            ChildEvent::DispatchReads => {
                let mut quota = {
                    let stream = &mut self.store[key];
                    if stream.auto_read {
                        ::std::usize::MAX
                    } else if stream.read_requested {
                        stream.read_requested = false;
                        stream.max_messages_per_read
                    } else {
                        0
                    }
                };

                while quota > 0 {
                    let item = match self.store.get_mut(key).and_then(|s| s.read_queue.pop_front())
                    {
                        Some(item) => item,
                        None => break,
                    };

                    match item {
                        ReadItem::Frame(frame) => {
                            handler.on_frame(&mut ChannelContext::new(self, key), frame);
                            quota -= 1;
                        }
                        ReadItem::Eos => {
                            trace!("end of stream drained; key={:?}", key);
                            self.close_channel(key);
                            break;
                        }
                    }

                    // the callback may have closed the channel
                    match self.store.get(key) {
                        Some(stream) if stream.state != ChannelState::Closed => {}
                        _ => break,
                    }
                }
            }
            ChildEvent::ReadComplete => {
                // Clear the flag before firing so the callback can queue
                // the channel for the next batch.
                self.store[key].in_read_complete_batch = false;
                handler.on_read_complete(&mut ChannelContext::new(self, key));
            }
            ChildEvent::WritabilityChanged => {
                handler.on_writability_changed(&mut ChannelContext::new(self, key));
            }
            ChildEvent::GoAway(frame) => {
                handler.on_go_away(&mut ChannelContext::new(self, key), frame);
            }
            ChildEvent::Error(err) => {
                handler.on_error(&mut ChannelContext::new(self, key), err);
            }
            ChildEvent::Closed => {
                handler.on_close(&mut ChannelContext::new(self, key));
                self.store.remove(key);
                // the slab slot may be reused; drop anything still aimed at it
                self.read_batch.retain(|&k| k != key);
                self.events.retain(|&(k, _)| k != key);
                return;
            }
        }

        if let Some(stream) = self.store.get_mut(key) {
            stream.handler = Some(handler);
        }
    }
}

// ===== submission =====

/// Dispatch queued child events and push pending frames into the sink until
/// the multiplexer quiesces.
pub(crate) fn run<T>(me: &mut Inner<T>) -> Result<(), ConnectionError>
where
    T: Sink<SinkItem = Frame, SinkError = ConnectionError>,
{
    let mut ret = Ok(());
    let mut blocked = false;

    loop {
        if ret.is_ok() && !blocked {
            match drain_pending(me) {
                Ok(()) => blocked = !me.actions.pending_send.is_empty(),
                Err(e) => ret = Err(e),
            }
        }

        // Flush before dispatching so a close's RESET is on the wire by the
        // time the channel observes its own close.
        if me.actions.flush_requested && ret.is_ok() && !blocked {
            me.actions.flush_requested = false;
            if let Err(e) = me.sink.poll_complete() {
                ret = Err(e);
            }
        }

        me.actions.drain_events();

        if !me.actions.events.is_empty() {
            continue;
        }

        if ret.is_err() || blocked {
            break;
        }

        if me.actions.pending_send.is_empty() && !me.actions.flush_requested {
            break;
        }
    }

    ret
}

/// Like [`run`], logging instead of returning submission failures; the
/// affected channel was already notified.
pub(crate) fn finish<T>(me: &mut Inner<T>)
where
    T: Sink<SinkItem = Frame, SinkError = ConnectionError>,
{
    if let Err(e) = run(me) {
        debug!("deferred write failed; err={}", e);
    }
}

fn drain_pending<T>(me: &mut Inner<T>) -> Result<(), ConnectionError>
where
    T: Sink<SinkItem = Frame, SinkError = ConnectionError>,
{
    while let Some(PendingSend { frame, listener }) = me.actions.pending_send.pop_front() {
        match me.sink.start_send(frame) {
            Ok(AsyncSink::Ready) => {
                if let Some(key) = listener {
                    me.actions.complete_activation(key);
                }
            }
            Ok(AsyncSink::NotReady(frame)) => {
                trace!("parent sink full; parking frame");
                me.actions.pending_send.push_front(PendingSend {
                    frame: frame,
                    listener: listener,
                });
                return Ok(());
            }
            Err(e) => {
                debug!("parent write failed; err={}", e);
                if let Some(key) = listener {
                    let cause = recv_cause(&e);
                    me.actions.events.push_back((key, ChildEvent::Error(cause)));
                    me.actions.close_channel(key);
                }
                return Err(e);
            }
        }
    }

    Ok(())
}

fn recv_cause(err: &ConnectionError) -> RecvError {
    match *err {
        ConnectionError::Proto(reason) => RecvError::Connection(reason),
        ConnectionError::Io(ref e) => {
            RecvError::Io(io::Error::new(e.kind(), "parent write failed"))
        }
    }
}
