use proto::StreamHandler;
use proto::Stream;

use std::fmt;

/// Template for the logical channel built for each new stream.
///
/// Carries the handler factory plus the option and attribute maps applied
/// to every channel the multiplexer constructs, whether for a remotely
/// initiated stream or for a locally initiated one. The bootstrap is
/// consumed when the multiplexer is attached to the parent connection.
pub struct Bootstrap {
    handler: Box<Fn() -> Box<StreamHandler>>,
    options: Vec<(String, usize)>,
    attrs: Vec<(String, String)>,
}

impl Bootstrap {
    /// `handler` builds the application handler installed on each new
    /// stream channel.
    pub fn new<F>(handler: F) -> Bootstrap
    where
        F: Fn() -> Box<StreamHandler> + 'static,
    {
        Bootstrap {
            handler: Box::new(handler),
            options: Vec::new(),
            attrs: Vec::new(),
        }
    }

    /// Set a channel option applied to every stream channel.
    ///
    /// Known options are `auto_read` (non-zero enables, the default) and
    /// `max_messages_per_read`. Unknown options are logged and skipped;
    /// they never fail channel creation.
    pub fn option<N>(mut self, name: N, value: usize) -> Bootstrap
    where
        N: Into<String>,
    {
        self.options.push((name.into(), value));
        self
    }

    /// Attach an attribute to every stream channel.
    pub fn attr<K, V>(mut self, name: K, value: V) -> Bootstrap
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub(crate) fn build_handler(&self) -> Box<StreamHandler> {
        (self.handler)()
    }

    pub(crate) fn apply(&self, stream: &mut Stream) {
        for &(ref name, value) in &self.options {
            match &name[..] {
                "auto_read" => stream.auto_read = value != 0,
                "max_messages_per_read" => stream.max_messages_per_read = value,
                _ => warn!("unknown channel option; name={:?}", name),
            }
        }

        for &(ref name, ref value) in &self.attrs {
            stream.attrs.insert(name.clone(), value.clone());
        }
    }
}

impl fmt::Debug for Bootstrap {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Bootstrap")
            .field("options", &self.options)
            .field("attrs", &self.attrs)
            .finish()
    }
}
