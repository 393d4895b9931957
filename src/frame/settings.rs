use frame::Frame;

/// Settings frame
///
/// Conveys the peer's configuration parameters. Only the parameters a
/// multiplexer cares about are modeled; absent parameters stay `None` and
/// leave the current value untouched.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    ack: bool,
    initial_window_size: Option<u32>,
    max_concurrent_streams: Option<u32>,
    max_frame_size: Option<u32>,
}

impl Settings {
    pub fn new() -> Settings {
        Settings::default()
    }

    /// An acknowledgement of the peer's settings.
    pub fn ack() -> Settings {
        Settings {
            ack: true,
            ..Settings::default()
        }
    }

    pub fn is_ack(&self) -> bool {
        self.ack
    }

    pub fn initial_window_size(&self) -> Option<u32> {
        self.initial_window_size
    }

    pub fn set_initial_window_size(&mut self, size: Option<u32>) {
        self.initial_window_size = size;
    }

    pub fn max_concurrent_streams(&self) -> Option<u32> {
        self.max_concurrent_streams
    }

    pub fn set_max_concurrent_streams(&mut self, max: Option<u32>) {
        self.max_concurrent_streams = max;
    }

    pub fn max_frame_size(&self) -> Option<u32> {
        self.max_frame_size
    }

    pub fn set_max_frame_size(&mut self, size: Option<u32>) {
        self.max_frame_size = size;
    }
}

impl From<Settings> for Frame {
    fn from(src: Settings) -> Frame {
        Frame::Settings(src)
    }
}
