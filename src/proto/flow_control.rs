use proto::{WindowSize, MAX_WINDOW_SIZE};

use std::cmp;

/// The outbound flow-control window of a single stream.
///
/// The counter never goes negative: data that does not fit is refused
/// before the window is touched. A positive window means the stream is
/// writable.
#[derive(Copy, Clone, Debug)]
pub struct FlowControl {
    /// The amount of the window that is currently available to consume.
    available: WindowSize,
}

impl FlowControl {
    pub fn new() -> FlowControl {
        FlowControl { available: 0 }
    }

    /// Returns the window size available to the consumer
    pub fn available(&self) -> WindowSize {
        self.available
    }

    pub fn is_writable(&self) -> bool {
        self.available > 0
    }

    /// Expand the window, e.g. on stream activation or WINDOW_UPDATE.
    pub fn assign_capacity(&mut self, capacity: WindowSize) {
        self.available = cmp::min(
            self.available.saturating_add(capacity),
            MAX_WINDOW_SIZE,
        );
    }

    /// Claim window capacity for outbound data. The caller picks the error
    /// returned when the window is too small.
    pub fn claim_capacity<E>(&mut self, capacity: WindowSize, err: E) -> Result<(), E> {
        if self.available < capacity {
            return Err(err);
        }

        self.available -= capacity;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_window_is_not_writable() {
        let flow = FlowControl::new();
        assert_eq!(0, flow.available());
        assert!(!flow.is_writable());
    }

    #[test]
    fn assign_then_claim() {
        let mut flow = FlowControl::new();
        flow.assign_capacity(10);
        assert!(flow.is_writable());

        flow.claim_capacity(4, ()).unwrap();
        assert_eq!(6, flow.available());

        flow.claim_capacity(6, ()).unwrap();
        assert!(!flow.is_writable());
    }

    #[test]
    fn claim_past_window_is_refused() {
        let mut flow = FlowControl::new();
        flow.assign_capacity(3);

        assert_eq!(Err("nope"), flow.claim_capacity(4, "nope"));

        // The window is untouched by the refusal
        assert_eq!(3, flow.available());
    }

    #[test]
    fn assign_saturates_at_max_window() {
        let mut flow = FlowControl::new();
        flow.assign_capacity(MAX_WINDOW_SIZE);
        flow.assign_capacity(MAX_WINDOW_SIZE);
        assert_eq!(MAX_WINDOW_SIZE, flow.available());
    }
}
