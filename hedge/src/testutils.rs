//! Test doubles shared by the crate's test modules.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use bytes::{Bytes, BytesMut};
use http::HeaderMap;
use parking_lot::Mutex;

use crate::clock::Clock;
use crate::sink::{FetchSink, RequestContext, SinkInfo};

/// Everything a sink can observe, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum SinkEvent {
    HeadersComplete,
    Write(Bytes),
    Flush,
    Done(bool),
}

/// Target sink that records every call for assertions.
///
/// Its advisory methods answer false so tests can tell a forwarded call
/// apart from a disqualified racer's built-in true.
pub struct RecordingSink {
    info: SinkInfo,
    events: Mutex<Vec<SinkEvent>>,
    accept_writes: bool,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Self::with_request_headers(HeaderMap::new())
    }

    pub fn with_request_headers(request_headers: HeaderMap) -> Arc<Self> {
        Arc::new(RecordingSink {
            info: SinkInfo::new(request_headers, RequestContext::new()),
            events: Mutex::new(Vec::new()),
            accept_writes: true,
        })
    }

    /// A target whose `write` refuses every chunk.
    pub fn rejecting_writes() -> Arc<Self> {
        Arc::new(RecordingSink {
            info: SinkInfo::new(HeaderMap::new(), RequestContext::new()),
            events: Mutex::new(Vec::new()),
            accept_writes: false,
        })
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// All written chunks, concatenated.
    pub fn body(&self) -> Bytes {
        let mut body = BytesMut::new();
        for event in self.events.lock().iter() {
            if let SinkEvent::Write(data) = event {
                body.extend_from_slice(data);
            }
        }
        body.freeze()
    }

    /// The success flag of the final `done` call, if any.
    pub fn done_success(&self) -> Option<bool> {
        self.events.lock().iter().rev().find_map(|event| match event {
            SinkEvent::Done(success) => Some(*success),
            _ => None,
        })
    }
}

impl FetchSink for RecordingSink {
    fn info(&self) -> &SinkInfo {
        &self.info
    }

    fn headers_complete(&self) {
        self.events.lock().push(SinkEvent::HeadersComplete);
    }

    fn write(&self, data: Bytes) -> bool {
        self.events.lock().push(SinkEvent::Write(data));
        self.accept_writes
    }

    fn flush(&self) -> bool {
        self.events.lock().push(SinkEvent::Flush);
        true
    }

    fn done(&self, success: bool) {
        self.events.lock().push(SinkEvent::Done(success));
    }

    fn is_cached_result_valid(&self, _headers: &HeaderMap) -> bool {
        false
    }

    fn is_background_fetch(&self) -> bool {
        false
    }
}

/// Manually advanced test clock.
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        ManualClock {
            now: AtomicI64::new(now_ms),
        }
    }

    #[allow(dead_code)]
    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
