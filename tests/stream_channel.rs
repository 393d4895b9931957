extern crate bytes;
extern crate env_logger;
extern crate futures;
extern crate h2_mux;
extern crate http;

mod support;

use support::*;
use support::frames;

use h2_mux::{Bootstrap, ChannelState, Config, ConnectionError, Multiplexer, Reason, SendError,
             StreamHandler, UserError};
use h2_mux::{Client, Server};

fn client(events: &Events) -> (Multiplexer<MockSink, Client>, SinkHandle) {
    let (sink, parent) = mock_sink();
    let ev = events.clone();
    let bootstrap = Bootstrap::new(move || Box::new(TestHandler::new(&ev)) as Box<StreamHandler>);
    (Multiplexer::new(sink, bootstrap, Config::default()), parent)
}

fn server(events: &Events) -> (Multiplexer<MockSink, Server>, SinkHandle) {
    let (sink, parent) = mock_sink();
    let ev = events.clone();
    let bootstrap = Bootstrap::new(move || Box::new(TestHandler::new(&ev)) as Box<StreamHandler>);
    (Multiplexer::new(sink, bootstrap, Config::default()), parent)
}

fn server_with_window(
    events: &Events,
    window: u32,
) -> (Multiplexer<MockSink, Server>, SinkHandle) {
    let (sink, parent) = mock_sink();
    let ev = events.clone();
    let bootstrap = Bootstrap::new(move || Box::new(TestHandler::new(&ev)) as Box<StreamHandler>);
    let config = Config {
        initial_window_size: window,
    };
    (Multiplexer::new(sink, bootstrap, config), parent)
}

fn assert_user_err(result: Result<(), SendError>, expected: UserError) {
    match result {
        Err(SendError::User(err)) => assert_eq!(expected, err),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn data_before_headers_is_rejected() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = client(&events);

    let mut channel = mux.new_stream();
    assert_user_err(
        channel.write(frames::body("hi")),
        UserError::FirstFrameMustBeHeaders,
    );

    // the rejected frame never reached the parent
    assert!(parent.take_sent().is_empty());
    assert!(channel.stream_id().is_none());

    // HEADERS afterwards still opens the stream
    channel.write(frames::request()).unwrap();
    assert_eq!(1, parent.take_sent().len());
}

#[test]
fn prebound_stream_frame_is_rejected() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = client(&events);

    let mut channel = mux.new_stream();
    assert_user_err(
        channel.write(frames::headers(5)),
        UserError::StreamIdAlreadySet,
    );
    assert!(parent.take_sent().is_empty());
}

#[test]
fn connection_frames_other_than_goaway_are_rejected() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = client(&events);

    let mut channel = mux.new_stream();
    assert_user_err(
        channel.write(frames::settings_empty()),
        UserError::UnexpectedFrameType,
    );
    assert!(parent.take_sent().is_empty());
}

#[test]
fn goaway_write_bypasses_the_binding_rules() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = client(&events);

    let mut channel = mux.new_stream();
    channel.write(frames::go_away(0)).unwrap();

    let sent = parent.take_sent();
    assert_eq!(1, sent.len());
    assert_go_away(&sent[0], 0);
}

#[test]
fn first_headers_write_opens_the_stream() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = client(&events);

    let mut channel = mux.new_stream();
    assert!(channel.stream_id().is_none());
    assert!(!channel.is_writable());
    assert_eq!(ChannelState::Initial, channel.state());

    channel.write(frames::request()).unwrap();

    let sent = parent.take_sent();
    assert_eq!(1, sent.len());
    assert_headers(&sent[0], 1);

    // the write succeeded, so the stream is active and the window credited
    assert_eq!(Some(sid(1)), channel.stream_id());
    assert_eq!(ChannelState::Open, channel.state());
    assert_eq!(65_535, channel.send_window());
    assert_eq!(
        events.take(),
        vec![Event::Writability { id: sid(1), writable: true }]
    );
}

#[test]
fn local_stream_ids_follow_the_endpoint_role() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, _parent) = client(&events);

    let mut first = mux.new_stream();
    let mut second = mux.new_stream();
    first.write(frames::request()).unwrap();
    second.write(frames::request()).unwrap();

    assert_eq!(Some(sid(1)), first.stream_id());
    assert_eq!(Some(sid(3)), second.stream_id());

    let (mut mux, _parent) = server(&events);
    let mut pushed = mux.new_stream();
    pushed.write(frames::request()).unwrap();

    assert_eq!(Some(sid(2)), pushed.stream_id());
}

#[test]
fn data_writes_claim_the_send_window() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = server_with_window(&events, 5);

    let mut channel = mux.stream_active(sid(1));
    events.take();

    channel.write(frames::response()).unwrap();
    channel.write(frames::body("hello")).unwrap();

    // the window is exhausted
    assert!(!channel.is_writable());
    assert_eq!(0, channel.send_window());
    assert_eq!(
        events.take(),
        vec![Event::Writability { id: sid(1), writable: false }]
    );

    let sent = parent.take_sent();
    assert_eq!(2, sent.len());
    assert_headers(&sent[0], 1);
    assert_data(&sent[1], 1, "hello");

    // no window left for another byte
    assert_user_err(
        channel.write(frames::body("x")),
        UserError::FlowControlViolation,
    );
    assert!(parent.take_sent().is_empty());
}

#[test]
fn window_update_restores_writability() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = server_with_window(&events, 5);

    let mut channel = mux.stream_active(sid(1));
    channel.write(frames::response()).unwrap();
    channel.write(frames::body("hello")).unwrap();
    events.take();
    parent.take_sent();

    mux.recv_frame(frames::window_update(1, 10)).unwrap();

    // the credit lands before the frame is delivered
    assert_eq!(
        events.take(),
        vec![
            Event::Writability { id: sid(1), writable: true },
            Event::Frame { id: sid(1), kind: "WINDOW_UPDATE", eos: false },
        ]
    );
    assert_eq!(10, channel.send_window());

    channel.write(frames::body("x")).unwrap();
    assert_eq!(9, channel.send_window());
}

#[test]
fn close_cancels_the_stream_on_the_wire() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = server(&events);

    let mut channel = mux.stream_active(sid(7));
    events.take();

    channel.close();

    let sent = parent.take_sent();
    assert_eq!(1, sent.len());
    assert_reset(&sent[0], 7, Reason::Cancel);
    assert!(parent.flushes() > 0);

    assert_eq!(events.take(), vec![Event::Closed { id: sid(7) }]);
    assert_eq!(0, mux.num_active_streams());
    assert_eq!(ChannelState::Closed, channel.state());
}

#[test]
fn double_close_is_a_noop() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = server(&events);

    let mut channel = mux.stream_active(sid(7));
    events.take();

    channel.close();
    channel.close();

    assert_eq!(1, parent.take_sent().len());
    assert_eq!(events.take(), vec![Event::Closed { id: sid(7) }]);
}

#[test]
fn write_after_close_fails() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = server(&events);

    let mut channel = mux.stream_active(sid(7));
    channel.close();
    parent.take_sent();

    assert_user_err(channel.write(frames::response()), UserError::InactiveStream);
    assert!(parent.take_sent().is_empty());
}

#[test]
fn consume_bytes_requires_an_open_stream() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, _parent) = client(&events);

    let mut channel = mux.new_stream();
    assert_user_err(channel.consume_bytes(4), UserError::InactiveStream);
}

#[test]
fn writes_stay_ordered_and_flush_is_explicit() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = server(&events);

    let mut channel = mux.stream_active(sid(1));
    channel.write(frames::response()).unwrap();
    channel.write(frames::body("a")).unwrap();
    channel.write(frames::body("b")).unwrap();

    assert_eq!(0, parent.flushes());

    channel.flush().unwrap();
    assert!(parent.flushes() > 0);

    let sent = parent.take_sent();
    assert_eq!(3, sent.len());
    assert_headers(&sent[0], 1);
    assert_data(&sent[1], 1, "a");
    assert_data(&sent[2], 1, "b");
}

#[test]
fn parked_writes_drain_on_flush() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = client(&events);

    parent.not_ready(1);

    let mut channel = mux.new_stream();
    channel.write(frames::request()).unwrap();

    // the frame is parked and the stream is not active yet
    assert!(parent.take_sent().is_empty());
    assert_eq!(Some(sid(1)), channel.stream_id());
    assert!(!channel.is_writable());
    assert!(events.take().is_empty());

    channel.flush().unwrap();

    let sent = parent.take_sent();
    assert_eq!(1, sent.len());
    assert_headers(&sent[0], 1);

    // activation fired once the parent took the frame
    assert_eq!(
        events.take(),
        vec![Event::Writability { id: sid(1), writable: true }]
    );
    assert!(channel.is_writable());
}

#[test]
fn failed_first_write_closes_the_channel() {
    let _ = ::env_logger::init();

    let events = Events::new();
    let (mut mux, parent) = client(&events);

    parent.fail_next(ConnectionError::Proto(Reason::InternalError));

    let mut channel = mux.new_stream();
    let result = channel.write(frames::request());

    match result {
        Err(SendError::Connection(ConnectionError::Proto(Reason::InternalError))) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    let fired = events.take();
    assert_eq!(2, fired.len());
    match fired[0] {
        Event::Error { id, .. } => assert_eq!(sid(1), id),
        ref event => panic!("unexpected event: {:?}", event),
    }
    assert_eq!(Event::Closed { id: sid(1) }, fired[1]);

    assert_eq!(0, mux.num_active_streams());
}
