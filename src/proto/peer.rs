use frame::StreamId;

/// Either a client or a server.
///
/// The role of the local endpoint decides which stream id parity is
/// "locally initiated": odd ids belong to the client, even ids to the
/// server.
pub trait Peer {
    /// Returns `true` if running in the context of an HTTP/2 server.
    fn is_server() -> bool;

    /// The identifier handed to the first locally initiated stream.
    fn first_local_id() -> StreamId {
        if Self::is_server() {
            StreamId::from(2)
        } else {
            StreamId::from(1)
        }
    }
}

/// The client role.
#[derive(Debug)]
pub struct Client;

/// The server role.
#[derive(Debug)]
pub struct Server;

impl Peer for Client {
    fn is_server() -> bool {
        false
    }
}

impl Peer for Server {
    fn is_server() -> bool {
        true
    }
}
