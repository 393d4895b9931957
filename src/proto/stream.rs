use frame::{Frame, StreamId};
use proto::FlowControl;
use proto::channel::StreamHandler;

use std::collections::{HashMap, VecDeque};

/// Per-stream channel state, owned by the registry.
pub(crate) struct Stream {
    /// The bound stream id; zero until the stream is opened.
    pub id: StreamId,

    pub state: ChannelState,

    /// Frames waiting for the application.
    pub read_queue: VecDeque<ReadItem>,

    /// Outbound flow-control window.
    pub send_flow: FlowControl,

    /// The channel has submitted its first frame.
    pub first_frame_written: bool,

    /// The protocol closed the stream; closing the channel must not emit a
    /// RESET.
    pub stream_closed_without_error: bool,

    /// The channel is queued for the current read-complete batch.
    pub in_read_complete_batch: bool,

    /// Activation credit has been applied.
    pub activated: bool,

    pub auto_read: bool,

    pub max_messages_per_read: usize,

    /// An explicit `read()` is outstanding.
    pub read_requested: bool,

    /// The application handler. Taken while one of its callbacks runs.
    pub handler: Option<Box<StreamHandler>>,

    pub attrs: HashMap<String, String>,
}

/// An entry on a channel's read queue.
pub(crate) enum ReadItem {
    Frame(Frame),
    /// End of stream: the protocol closed the stream.
    Eos,
}

/// The lifecycle of a logical stream channel, as the application observes
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Created, stream not yet open.
    Initial,
    /// The stream is open in both directions.
    Open,
    /// END_STREAM was observed in one direction.
    HalfClosed,
    /// The channel finished closing.
    Closed,
}

impl Stream {
    pub fn new(handler: Box<StreamHandler>) -> Stream {
        Stream {
            id: StreamId::zero(),
            state: ChannelState::Initial,
            read_queue: VecDeque::new(),
            send_flow: FlowControl::new(),
            first_frame_written: false,
            stream_closed_without_error: false,
            in_read_complete_batch: false,
            activated: false,
            auto_read: true,
            max_messages_per_read: 16,
            read_requested: false,
            handler: Some(handler),
            attrs: HashMap::new(),
        }
    }

    pub fn open(&mut self) {
        if self.state == ChannelState::Initial {
            self.state = ChannelState::Open;
        }
    }

    /// END_STREAM observed on an inbound frame.
    pub fn recv_eos(&mut self) {
        self.half_close();
    }

    /// END_STREAM submitted on an outbound frame.
    pub fn send_eos(&mut self) {
        self.half_close();
    }

    fn half_close(&mut self) {
        match self.state {
            ChannelState::Initial | ChannelState::Open => {
                self.state = ChannelState::HalfClosed;
            }
            _ => {}
        }
    }
}
