use super::StreamId;
use frame::Frame;

use http::{uri, Method, StatusCode, Uri};
use http::HeaderMap;

/// Header frame
///
/// This could be either a request or a response.
#[derive(Debug, Clone)]
pub struct Headers {
    /// The ID of the stream with which this frame is associated.
    stream_id: StreamId,

    /// The header fields
    fields: HeaderMap,

    /// Pseudo headers, these are broken out as they must be sent as part of
    /// the headers frame.
    pseudo: Pseudo,

    /// Whether the frame ends the stream.
    end_stream: bool,
}

/// Push promise frame
///
/// Notifies the peer of a stream the sender intends to initiate.
#[derive(Debug, Clone, Copy)]
pub struct PushPromise {
    /// The ID of the stream with which this frame is associated.
    stream_id: StreamId,

    /// The ID of the stream being reserved by this PushPromise.
    promised_id: StreamId,
}

#[derive(Debug, Clone, Default)]
pub struct Pseudo {
    // Request
    method: Option<Method>,
    scheme: Option<String>,
    authority: Option<String>,
    path: Option<String>,

    // Response
    status: Option<StatusCode>,
}

// ===== impl Headers =====

impl Headers {
    pub fn new(stream_id: StreamId, pseudo: Pseudo, fields: HeaderMap) -> Self {
        Headers {
            stream_id: stream_id,
            fields: fields,
            pseudo: pseudo,
            end_stream: false,
        }
    }

    /// Returns `true` if the frame represents trailers
    ///
    /// Trailers are header frames that contain no pseudo headers.
    pub fn is_trailers(&self) -> bool {
        self.pseudo.method.is_none() && self.pseudo.status.is_none()
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub(crate) fn set_stream_id(&mut self, stream_id: StreamId) {
        self.stream_id = stream_id;
    }

    pub fn is_end_stream(&self) -> bool {
        self.end_stream
    }

    pub fn set_end_stream(&mut self) {
        self.end_stream = true;
    }

    pub fn pseudo(&self) -> &Pseudo {
        &self.pseudo
    }

    pub fn fields(&self) -> &HeaderMap {
        &self.fields
    }

    pub fn into_fields(self) -> HeaderMap {
        self.fields
    }
}

impl From<Headers> for Frame {
    fn from(src: Headers) -> Frame {
        Frame::Headers(src)
    }
}

// ===== impl PushPromise =====

impl PushPromise {
    pub fn new(stream_id: StreamId, promised_id: StreamId) -> Self {
        PushPromise {
            stream_id: stream_id,
            promised_id: promised_id,
        }
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub(crate) fn set_stream_id(&mut self, stream_id: StreamId) {
        self.stream_id = stream_id;
    }

    pub fn promised_id(&self) -> StreamId {
        self.promised_id
    }
}

impl From<PushPromise> for Frame {
    fn from(src: PushPromise) -> Frame {
        Frame::PushPromise(src)
    }
}

// ===== impl Pseudo =====

impl Pseudo {
    pub fn request(method: Method, uri: Uri) -> Self {
        let parts = uri::Parts::from(uri);

        let path = parts
            .path_and_query
            .as_ref()
            .map(|v| v.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let mut pseudo = Pseudo {
            method: Some(method),
            scheme: None,
            authority: None,
            path: Some(path),
            status: None,
        };

        // If the URI includes a scheme component, add it to the pseudo headers
        if let Some(scheme) = parts.scheme {
            pseudo.set_scheme(scheme.as_str().to_string());
        }

        // If the URI includes an authority component, add it to the pseudo
        // headers
        if let Some(authority) = parts.authority {
            pseudo.set_authority(authority.as_str().to_string());
        }

        pseudo
    }

    pub fn response(status: StatusCode) -> Self {
        Pseudo {
            method: None,
            scheme: None,
            authority: None,
            path: None,
            status: Some(status),
        }
    }

    pub fn set_scheme(&mut self, scheme: String) {
        self.scheme = Some(scheme);
    }

    pub fn set_authority(&mut self, authority: String) {
        self.authority = Some(authority);
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_ref().map(|v| &v[..])
    }
}
