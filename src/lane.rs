//! Cancel-and-supersede request slot.
//!
//! Each lane holds at most one live request. `begin` cancels whatever was
//! in flight and hands out a ticket carrying a fresh generation number; a
//! response is only applied while its ticket is still current.

use std::future::Future;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::CompletionError;

/// Claim on a lane for one request.
#[derive(Debug, Clone)]
pub struct LaneTicket {
    pub generation: u64,
    token: CancellationToken,
}

impl LaneTicket {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    token: CancellationToken,
}

#[derive(Debug)]
pub struct RequestLane {
    name: &'static str,
    slot: Mutex<Slot>,
}

impl RequestLane {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: Mutex::new(Slot {
                generation: 0,
                token: CancellationToken::new(),
            }),
        }
    }

    /// Supersede the in-flight request (if any) and claim the lane.
    pub fn begin(&self) -> LaneTicket {
        let mut slot = self.slot.lock();
        slot.token.cancel();
        slot.generation += 1;
        slot.token = CancellationToken::new();
        log::debug!("{} lane: request #{}", self.name, slot.generation);
        LaneTicket {
            generation: slot.generation,
            token: slot.token.clone(),
        }
    }

    /// True while no newer request has been issued on this lane.
    pub fn is_current(&self, ticket: &LaneTicket) -> bool {
        let slot = self.slot.lock();
        slot.generation == ticket.generation && !ticket.token.is_cancelled()
    }

    pub fn generation(&self) -> u64 {
        self.slot.lock().generation
    }

    /// Cancel the in-flight request without issuing a new one.
    pub fn cancel(&self) {
        self.slot.lock().token.cancel();
    }

    /// Drive `request` until it resolves or the ticket is superseded.
    /// Supersession drops the request future and yields `Canceled`.
    pub async fn run<T, F>(&self, ticket: &LaneTicket, request: F) -> Result<T, CompletionError>
    where
        F: Future<Output = Result<T, CompletionError>>,
    {
        tokio::select! {
            biased;
            _ = ticket.token.cancelled() => {
                log::debug!("{} lane: request #{} superseded", self.name, ticket.generation);
                Err(CompletionError::Canceled)
            }
            result = request => result,
        }
    }
}
