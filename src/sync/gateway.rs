//! Sync gateway: the only path through which local state reaches the
//! provider.
//!
//! At most one request is in flight. Pushes made while waiting coalesce into
//! a single queued request (last write wins) that leaves as soon as the
//! in-flight one is answered. A reset bypasses the queue. Every request gets
//! a sequence number; a response older than the newest request is stale and
//! is discarded.

use serde_json::Value;

use super::host::Host;
use super::message::{EventKind, SyncRequest, SyncResponse};
use crate::error::Result;

/// What happened to a pushed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Committed to the host under this sequence number.
    Sent(u64),
    /// Folded into the queued request behind the one in flight.
    Coalesced,
}

/// What to do with an incoming response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    /// Apply the response. `followup` is the sequence number of a queued
    /// request that was released by it.
    Apply { followup: Option<u64> },
    /// Answers a superseded request; drop it.
    Stale,
}

impl Receipt {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// Sequencing and coalescing in front of a [`Host`].
#[derive(Debug)]
pub struct SyncGateway<H> {
    host: H,
    issued: u64,
    in_flight: Option<u64>,
    queued: Option<SyncRequest>,
    applied: u64,
}

impl<H: Host> SyncGateway<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            issued: 0,
            in_flight: None,
            queued: None,
            applied: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Sequence number of the newest request committed.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// True while a request awaits its response.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The request waiting behind the one in flight.
    pub fn queued(&self) -> Option<&SyncRequest> {
        self.queued.as_ref()
    }

    /// Push local state to the provider.
    pub fn push(&mut self, request: SyncRequest) -> Result<PushOutcome> {
        if self.in_flight.is_some() && request.event != EventKind::Reset {
            tracing::debug!(event = request.event.as_str(), "coalescing behind in-flight sync");
            self.queued = Some(request);
            return Ok(PushOutcome::Coalesced);
        }
        self.commit(request).map(PushOutcome::Sent)
    }

    /// True if a response carrying `seq` answers a superseded request.
    pub fn is_stale(&self, seq: Option<u64>) -> bool {
        seq.is_some_and(|seq| seq != 0 && (seq < self.issued || seq <= self.applied))
    }

    /// Drop the queued request without sending it.
    pub fn discard_queued(&mut self) -> Option<SyncRequest> {
        self.queued.take()
    }

    /// Classify a response and release the queued request if it was
    /// answered.
    ///
    /// Responses without a sequence number (or with 0, which no request
    /// ever carries) are provider pushes: they always apply and leave the
    /// in-flight request alone.
    pub fn receive(&mut self, response: &SyncResponse) -> Result<Receipt> {
        let Some(seq) = response.seq.filter(|&seq| seq != 0) else {
            return Ok(Receipt::Apply { followup: None });
        };
        if self.is_stale(Some(seq)) {
            tracing::debug!(seq, issued = self.issued, "discarding stale response");
            return Ok(Receipt::Stale);
        }
        self.applied = seq;
        self.in_flight = None;
        let followup = match self.queued.take() {
            Some(request) => Some(self.commit(request)?),
            None => None,
        };
        Ok(Receipt::Apply { followup })
    }

    /// Fire-and-forget message outside synced state.
    pub fn send(&mut self, payload: Value) -> Result<()> {
        self.host.send(payload)
    }

    fn commit(&mut self, mut request: SyncRequest) -> Result<u64> {
        self.issued += 1;
        request.seq = self.issued;
        for (key, value) in request.fields()? {
            self.host.set(key, value)?;
        }
        self.host.send_update()?;
        self.in_flight = Some(self.issued);
        // a reset supersedes whatever was waiting
        self.queued = None;
        tracing::debug!(
            seq = self.issued,
            event = request.event.as_str(),
            start = request.start_rows,
            end = request.end_rows,
            "sync sent"
        );
        Ok(self.issued)
    }
}
