use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use http::HeaderMap;
use parking_lot::Mutex;

/// Response metadata filled in by a fetcher before `headers_complete`.
#[derive(Clone, Debug, Default)]
pub struct ResponseInfo {
    pub headers: HeaderMap,
    /// Headers appended by intermediaries, kept apart from the origin's.
    pub extra_headers: HeaderMap,
    /// Content length when known ahead of the body.
    pub content_length: Option<u64>,
}

/// Per-sink metadata block: an immutable request-header snapshot, the
/// request context, and the mutex-guarded response metadata.
pub struct SinkInfo {
    request_headers: HeaderMap,
    context: RequestContext,
    response: Mutex<ResponseInfo>,
}

impl SinkInfo {
    pub fn new(request_headers: HeaderMap, context: RequestContext) -> Self {
        SinkInfo {
            request_headers,
            context,
            response: Mutex::new(ResponseInfo::default()),
        }
    }

    /// Immutable request metadata, snapshotted at construction.
    pub fn request_headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    pub fn request_context(&self) -> &RequestContext {
        &self.context
    }

    /// Snapshot of the current response metadata.
    pub fn response(&self) -> ResponseInfo {
        self.response.lock().clone()
    }

    /// Mutates the response metadata under the sink's metadata lock.
    pub fn update_response(&self, update: impl FnOnce(&mut ResponseInfo)) {
        update(&mut self.response.lock());
    }

    pub fn set_content_length(&self, length: u64) {
        self.response.lock().content_length = Some(length);
    }

    pub fn content_length(&self) -> Option<u64> {
        self.response.lock().content_length
    }

    /// Copies `from` onto this sink: headers and extra headers are
    /// replaced; the content length only when the source knows it.
    pub fn merge_response(&self, from: ResponseInfo) {
        let mut response = self.response.lock();
        response.headers = from.headers;
        response.extra_headers = from.extra_headers;
        if let Some(length) = from.content_length {
            response.content_length = Some(length);
        }
    }
}

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque per-request context, propagated from a target sink to every
/// child sink fetching on its behalf. Cheap to clone; the id ties
/// together log lines from all attempts for one request.
#[derive(Clone)]
pub struct RequestContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    id: u64,
}

impl RequestContext {
    pub fn new() -> Self {
        RequestContext {
            inner: Arc::new(ContextInner {
                id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RequestContext").field(&self.inner.id).finish()
    }
}

/// Destination for a single fetch: headers, body bytes, and a terminal
/// `done` call.
///
/// Contract: `headers_complete` is called at most once and before any
/// `write` or `flush`; `done` is called exactly once and last. `write`
/// and `flush` report downstream acceptance; a false return asks the
/// fetcher to stop producing.
pub trait FetchSink: Send + Sync {
    /// Shared metadata block for this sink.
    fn info(&self) -> &SinkInfo;

    /// Signals the end of the header phase.
    fn headers_complete(&self);

    /// Appends body bytes.
    fn write(&self, data: Bytes) -> bool;

    /// Boundary marker the downstream may act on.
    fn flush(&self) -> bool;

    /// Terminal call. No method may be invoked on this sink afterwards.
    fn done(&self, success: bool);

    /// Advisory: whether a cached result carrying these headers may be
    /// served without refetching.
    fn is_cached_result_valid(&self, headers: &HeaderMap) -> bool {
        let _ = headers;
        true
    }

    /// Advisory: whether this fetch may be treated as low priority.
    fn is_background_fetch(&self) -> bool {
        false
    }

    fn request_headers(&self) -> &HeaderMap {
        self.info().request_headers()
    }

    fn request_context(&self) -> &RequestContext {
        self.info().request_context()
    }

    fn set_content_length(&self, length: u64) {
        self.info().set_content_length(length);
    }

    fn content_length(&self) -> Option<u64> {
        self.info().content_length()
    }
}
