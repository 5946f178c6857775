//! Per-request mutable state shared by the aggregator and queue workers.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::stream::{build_stream, StreamContext};
use super::types::{SessionPhase, StreamDescriptor};
use crate::gateway::RawResult;
use crate::queue::ResolvedSink;
use crate::resolver::ResolvedReference;

struct SessionState {
    phase: SessionPhase,
    streams: Vec<StreamDescriptor>,
}

/// Collected streams for one request.
///
/// Streams are accepted only while the session is `Collecting`. The phase
/// check and the append happen under the same lock as `terminate`, so nothing
/// is added once finalization has started.
pub struct Session {
    context: StreamContext,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(context: StreamContext) -> Self {
        Self {
            context,
            state: Mutex::new(SessionState {
                phase: SessionPhase::Collecting,
                streams: Vec::new(),
            }),
        }
    }

    pub fn context(&self) -> &StreamContext {
        &self.context
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    pub fn is_terminated(&self) -> bool {
        self.phase() != SessionPhase::Collecting
    }

    /// Append a stream. Returns `false` once the session stopped collecting.
    pub fn push(&self, stream: StreamDescriptor) -> bool {
        let mut state = self.lock();
        if state.phase != SessionPhase::Collecting {
            debug!(info_hash = %stream.info_hash, "Dropping stream for terminated session");
            return false;
        }
        state.streams.push(stream);
        true
    }

    pub fn collected(&self) -> usize {
        self.lock().streams.len()
    }

    /// Enter `Finalizing` and take everything collected so far.
    pub fn terminate(&self) -> Vec<StreamDescriptor> {
        let mut state = self.lock();
        state.phase = SessionPhase::Finalizing;
        std::mem::take(&mut state.streams)
    }

    /// Enter `Done`.
    pub fn finish(&self) {
        self.lock().phase = SessionPhase::Done;
    }
}

impl ResolvedSink for Session {
    fn accept(&self, raw: &RawResult, reference: ResolvedReference) {
        if self.is_terminated() {
            return;
        }
        self.push(build_stream(raw, &reference, &self.context));
    }
}
