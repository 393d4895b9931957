mod channel;
mod flow_control;
mod mux;
mod peer;
mod store;
mod stream;

pub use self::channel::{ChannelContext, StreamChannel, StreamHandler};
pub use self::mux::{Config, Multiplexer};
pub use self::peer::{Client, Peer, Server};
pub use self::stream::ChannelState;

pub(crate) use self::flow_control::FlowControl;
pub(crate) use self::store::{Key, Store};
pub(crate) use self::stream::{ReadItem, Stream};

pub type WindowSize = u32;

// Constants
pub const DEFAULT_INITIAL_WINDOW_SIZE: WindowSize = 65_535;
pub const MAX_WINDOW_SIZE: WindowSize = (1 << 31) - 1;
