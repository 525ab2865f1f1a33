//! In-flight request bookkeeping
//!
//! Each logical query slot hands out increasing generations. Only the newest
//! ticket of a slot may apply its result; an older one that resolves late is
//! stale and must be discarded.

use serde::Serialize;
use std::collections::HashMap;

/// Logical query kinds that can be superseded independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RequestSlot {
    CountryList,
    CountryByName,
    BorderBatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestTicket {
    pub slot: RequestSlot,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    next_generation: u64,
    latest: HashMap<RequestSlot, u64>,
    in_flight: HashMap<RequestSlot, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any earlier one in the same slot
    pub fn begin(&mut self, slot: RequestSlot) -> RequestTicket {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.latest.insert(slot, generation);
        self.in_flight.insert(slot, generation);
        RequestTicket { slot, generation }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest.get(&ticket.slot) == Some(&ticket.generation)
    }

    /// Settle a request; returns `false` when its result is stale
    pub fn finish(&mut self, ticket: &RequestTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight.remove(&ticket.slot);
        true
    }

    /// Mark every outstanding request of `slot` stale without starting a new one
    pub fn cancel(&mut self, slot: RequestSlot) {
        self.next_generation += 1;
        self.latest.insert(slot, self.next_generation);
        self.in_flight.remove(&slot);
    }

    pub fn is_in_flight(&self, slot: RequestSlot) -> bool {
        self.in_flight.contains_key(&slot)
    }
}
