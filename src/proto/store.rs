use frame::StreamId;
use proto::stream::Stream;

use slab;

use std::collections::HashMap;
use std::ops;

/// Storage for stream channels.
///
/// Channels are stored in a slab and, once their stream is known, indexed
/// by stream id. Locally initiated channels start out unbound: they occupy
/// a slab slot without an id entry until the first HEADERS write assigns
/// their stream.
pub(crate) struct Store {
    slab: slab::Slab<Stream>,
    ids: HashMap<StreamId, usize>,
}

/// References an entry in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Key(usize);

// ===== impl Store =====

impl Store {
    pub fn new() -> Self {
        Store {
            slab: slab::Slab::new(),
            ids: HashMap::new(),
        }
    }

    /// Insert a channel that does not have a stream id yet.
    pub fn insert(&mut self, val: Stream) -> Key {
        Key(self.slab.insert(val))
    }

    /// Index an inserted channel by its stream id.
    pub fn bind(&mut self, id: StreamId, key: Key) {
        debug_assert!(!id.is_zero());
        let prev = self.ids.insert(id, key.0);
        debug_assert!(prev.is_none());
    }

    pub fn find_key(&self, id: StreamId) -> Option<Key> {
        self.ids.get(&id).map(|&key| Key(key))
    }

    pub fn get(&self, key: Key) -> Option<&Stream> {
        self.slab.get(key.0)
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut Stream> {
        self.slab.get_mut(key.0)
    }

    pub fn remove(&mut self, key: Key) -> Stream {
        let stream = self.slab.remove(key.0);

        if !stream.id.is_zero() {
            self.ids.remove(&stream.id);
        }

        stream
    }

    /// The number of streams with a bound id.
    pub fn num_bound(&self) -> usize {
        self.ids.len()
    }

    /// Visit every bound stream.
    pub fn for_each<F>(&mut self, mut f: F)
    where
        F: FnMut(Key, &mut Stream),
    {
        for (_, &key) in &self.ids {
            f(Key(key), &mut self.slab[key]);
        }
    }
}

impl ops::Index<Key> for Store {
    type Output = Stream;

    fn index(&self, key: Key) -> &Self::Output {
        &self.slab[key.0]
    }
}

impl ops::IndexMut<Key> for Store {
    fn index_mut(&mut self, key: Key) -> &mut Self::Output {
        &mut self.slab[key.0]
    }
}
