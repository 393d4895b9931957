#![allow(dead_code)]

use h2_mux::{ChannelContext, ConnectionError, Frame, RecvError, StreamHandler, StreamId};
use h2_mux::frame::{Data, GoAway, Headers, Ping, Pseudo, PushPromise, Reason, Reset, Settings,
                    WindowUpdate};

use bytes::Bytes;
use futures::{Async, AsyncSink, Poll, Sink, StartSend};
use http::{HeaderMap, Method, StatusCode, Uri};

use std::error::Error as StdError;
use std::sync::{Arc, Mutex};

// ===== mock parent sink =====

#[derive(Default)]
struct SinkState {
    sent: Vec<Frame>,
    flushes: usize,
    not_ready: usize,
    fail_next: Option<ConnectionError>,
}

/// A scriptable stand-in for the parent framing sink.
pub struct MockSink {
    state: Arc<Mutex<SinkState>>,
}

/// Shared view onto what the mock sink saw.
#[derive(Clone)]
pub struct SinkHandle {
    state: Arc<Mutex<SinkState>>,
}

pub fn mock_sink() -> (MockSink, SinkHandle) {
    let state = Arc::new(Mutex::new(SinkState::default()));
    (
        MockSink {
            state: state.clone(),
        },
        SinkHandle { state: state },
    )
}

impl Sink for MockSink {
    type SinkItem = Frame;
    type SinkError = ConnectionError;

    fn start_send(&mut self, item: Frame) -> StartSend<Frame, ConnectionError> {
        let mut state = self.state.lock().unwrap();

        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }

        if state.not_ready > 0 {
            state.not_ready -= 1;
            return Ok(AsyncSink::NotReady(item));
        }

        state.sent.push(item);
        Ok(AsyncSink::Ready)
    }

    fn poll_complete(&mut self) -> Poll<(), ConnectionError> {
        self.state.lock().unwrap().flushes += 1;
        Ok(Async::Ready(()))
    }

    fn close(&mut self) -> Poll<(), ConnectionError> {
        self.poll_complete()
    }
}

impl SinkHandle {
    pub fn sent(&self) -> Vec<Frame> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn take_sent(&self) -> Vec<Frame> {
        self.state.lock().unwrap().sent.split_off(0)
    }

    pub fn flushes(&self) -> usize {
        self.state.lock().unwrap().flushes
    }

    /// Reject the next `n` writes with NotReady.
    pub fn not_ready(&self, n: usize) {
        self.state.lock().unwrap().not_ready = n;
    }

    /// Fail the next write with the given error.
    pub fn fail_next(&self, err: ConnectionError) {
        self.state.lock().unwrap().fail_next = Some(err);
    }
}

// ===== recording handler =====

#[derive(Debug, PartialEq)]
pub enum Event {
    Frame {
        id: StreamId,
        kind: &'static str,
        eos: bool,
    },
    ReadComplete {
        id: StreamId,
    },
    Writability {
        id: StreamId,
        writable: bool,
    },
    GoAway {
        id: StreamId,
        last: StreamId,
    },
    Error {
        id: StreamId,
        message: String,
    },
    Closed {
        id: StreamId,
    },
}

/// Event log shared by every handler a bootstrap builds.
#[derive(Clone)]
pub struct Events {
    inner: Arc<Mutex<Vec<Event>>>,
}

impl Events {
    pub fn new() -> Events {
        Events {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn take(&self) -> Vec<Event> {
        self.inner.lock().unwrap().split_off(0)
    }

    fn push(&self, event: Event) {
        self.inner.lock().unwrap().push(event);
    }
}

/// A handler that records every callback, optionally running a hook on
/// inbound frames.
pub struct TestHandler {
    events: Events,
    on_frame_hook: Option<fn(&mut ChannelContext, &Frame)>,
}

impl TestHandler {
    pub fn new(events: &Events) -> TestHandler {
        TestHandler {
            events: events.clone(),
            on_frame_hook: None,
        }
    }

    pub fn with_hook(events: &Events, hook: fn(&mut ChannelContext, &Frame)) -> TestHandler {
        TestHandler {
            events: events.clone(),
            on_frame_hook: Some(hook),
        }
    }
}

impl StreamHandler for TestHandler {
    fn on_frame(&mut self, ctx: &mut ChannelContext, frame: Frame) {
        self.events.push(Event::Frame {
            id: ctx.stream_id().unwrap_or_else(StreamId::zero),
            kind: kind(&frame),
            eos: frame.is_end_stream(),
        });

        if let Some(hook) = self.on_frame_hook {
            hook(ctx, &frame);
        }
    }

    fn on_read_complete(&mut self, ctx: &mut ChannelContext) {
        self.events.push(Event::ReadComplete {
            id: ctx.stream_id().unwrap_or_else(StreamId::zero),
        });
    }

    fn on_writability_changed(&mut self, ctx: &mut ChannelContext) {
        self.events.push(Event::Writability {
            id: ctx.stream_id().unwrap_or_else(StreamId::zero),
            writable: ctx.is_writable(),
        });
    }

    fn on_go_away(&mut self, ctx: &mut ChannelContext, frame: GoAway) {
        self.events.push(Event::GoAway {
            id: ctx.stream_id().unwrap_or_else(StreamId::zero),
            last: frame.last_stream_id(),
        });
    }

    fn on_error(&mut self, ctx: &mut ChannelContext, err: RecvError) {
        self.events.push(Event::Error {
            id: ctx.stream_id().unwrap_or_else(StreamId::zero),
            message: err.description().to_string(),
        });
    }

    fn on_close(&mut self, ctx: &mut ChannelContext) {
        self.events.push(Event::Closed {
            id: ctx.stream_id().unwrap_or_else(StreamId::zero),
        });
    }
}

pub fn kind(frame: &Frame) -> &'static str {
    match *frame {
        Frame::Data(..) => "DATA",
        Frame::Headers(..) => "HEADERS",
        Frame::PushPromise(..) => "PUSH_PROMISE",
        Frame::Reset(..) => "RESET",
        Frame::Settings(..) => "SETTINGS",
        Frame::GoAway(..) => "GO_AWAY",
        Frame::WindowUpdate(..) => "WINDOW_UPDATE",
        Frame::Ping(..) => "PING",
    }
}

pub fn sid(id: u32) -> StreamId {
    StreamId::from(id)
}

// ===== frame constructors =====

pub mod frames {
    use super::*;

    fn uri() -> Uri {
        "https://example.com/".parse().unwrap()
    }

    /// Inbound request headers, bound to a stream.
    pub fn headers(id: u32) -> Frame {
        Headers::new(sid(id), Pseudo::request(Method::GET, uri()), HeaderMap::new()).into()
    }

    pub fn headers_eos(id: u32) -> Frame {
        let mut frame = Headers::new(sid(id), Pseudo::request(Method::GET, uri()), HeaderMap::new());
        frame.set_end_stream();
        frame.into()
    }

    /// Inbound data, bound to a stream.
    pub fn data(id: u32, payload: &'static str) -> Frame {
        Data::new(sid(id), Bytes::from_static(payload.as_bytes()), false).into()
    }

    pub fn data_eos(id: u32, payload: &'static str) -> Frame {
        Data::new(sid(id), Bytes::from_static(payload.as_bytes()), true).into()
    }

    pub fn window_update(id: u32, sz: u32) -> Frame {
        WindowUpdate::new(sid(id), sz).into()
    }

    pub fn push_promise(id: u32, promised: u32) -> Frame {
        PushPromise::new(sid(id), sid(promised)).into()
    }

    pub fn go_away(last: u32) -> Frame {
        GoAway::new(sid(last), Reason::NoError).into()
    }

    pub fn reset(id: u32, reason: Reason) -> Frame {
        Reset::new(sid(id), reason).into()
    }

    pub fn settings_initial_window(sz: u32) -> Frame {
        let mut frame = Settings::new();
        frame.set_initial_window_size(Some(sz));
        frame.into()
    }

    pub fn settings_empty() -> Frame {
        Settings::new().into()
    }

    pub fn ping() -> Frame {
        Ping::ping(Bytes::from_static(b"1234abcd")).into()
    }

    // application-side frames: the stream binding stays unset

    /// Request headers an application submits on a new stream.
    pub fn request() -> Frame {
        Headers::new(
            StreamId::zero(),
            Pseudo::request(Method::GET, uri()),
            HeaderMap::new(),
        ).into()
    }

    /// Response headers an application submits.
    pub fn response() -> Frame {
        Headers::new(
            StreamId::zero(),
            Pseudo::response(StatusCode::OK),
            HeaderMap::new(),
        ).into()
    }

    /// Body data an application submits.
    pub fn body(payload: &'static str) -> Frame {
        Data::new(StreamId::zero(), Bytes::from_static(payload.as_bytes()), false).into()
    }

    pub fn body_eos(payload: &'static str) -> Frame {
        Data::new(StreamId::zero(), Bytes::from_static(payload.as_bytes()), true).into()
    }
}

// ===== frame assertions =====

pub fn assert_headers(frame: &Frame, id: u32) {
    match *frame {
        Frame::Headers(ref v) => assert_eq!(sid(id), v.stream_id()),
        ref frame => panic!("expected HEADERS, got {:?}", frame),
    }
}

pub fn assert_data(frame: &Frame, id: u32, payload: &str) {
    match *frame {
        Frame::Data(ref v) => {
            assert_eq!(sid(id), v.stream_id());
            assert_eq!(payload.as_bytes(), &v.payload()[..]);
        }
        ref frame => panic!("expected DATA, got {:?}", frame),
    }
}

pub fn assert_reset(frame: &Frame, id: u32, reason: Reason) {
    match *frame {
        Frame::Reset(ref v) => {
            assert_eq!(sid(id), v.stream_id());
            assert_eq!(reason, v.reason());
        }
        ref frame => panic!("expected RESET, got {:?}", frame),
    }
}

pub fn assert_window_update(frame: &Frame, id: u32, sz: u32) {
    match *frame {
        Frame::WindowUpdate(ref v) => {
            assert_eq!(sid(id), v.stream_id());
            assert_eq!(sz, v.size_increment());
        }
        ref frame => panic!("expected WINDOW_UPDATE, got {:?}", frame),
    }
}

pub fn assert_go_away(frame: &Frame, last: u32) {
    match *frame {
        Frame::GoAway(ref v) => assert_eq!(sid(last), v.last_stream_id()),
        ref frame => panic!("expected GO_AWAY, got {:?}", frame),
    }
}
