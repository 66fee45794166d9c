//! Deferred actions tied to a session
//!
//! The core never sleeps. It queues actions with a delay; the host arms real
//! timers and hands each [`Ticket`] back when it expires. Tickets carry the
//! session epoch, so a ticket from before a reset is simply refused.

use serde::Serialize;

/// Work the host should run later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeferredAction {
    /// Raise the results overlay
    ShowResults,
    /// Leave for the landing page
    AutoRedirect,
}

/// Handle returned to the core when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ticket {
    epoch: u32,
    pub action: DeferredAction,
}

impl Ticket {
    pub fn epoch(&self) -> u32 {
        self.epoch
    }
}

/// A queued action waiting for the host to arm a timer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scheduled {
    pub ticket: Ticket,
    pub delay_ms: f32,
}

#[derive(Debug, Default)]
pub struct DeferredQueue {
    epoch: u32,
    pending: Vec<Scheduled>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Invalidate everything issued so far
    pub fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.pending.clear();
    }

    pub fn schedule(&mut self, action: DeferredAction, delay_ms: f32) {
        let ticket = Ticket {
            epoch: self.epoch,
            action,
        };
        self.pending.push(Scheduled {
            ticket,
            delay_ms: delay_ms.max(0.0),
        });
    }

    /// Hand queued actions to the host
    pub fn take_scheduled(&mut self) -> Vec<Scheduled> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.epoch == self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_and_take() {
        let mut queue = DeferredQueue::new();
        queue.schedule(DeferredAction::ShowResults, 200.0);
        let scheduled = queue.take_scheduled();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].delay_ms, 200.0);
        assert!(queue.is_current(&scheduled[0].ticket));
        assert!(queue.take_scheduled().is_empty());
    }

    #[test]
    fn test_bump_invalidates_tickets() {
        let mut queue = DeferredQueue::new();
        queue.schedule(DeferredAction::AutoRedirect, 6_000.0);
        queue.schedule(DeferredAction::ShowResults, 0.0);
        let old = queue.take_scheduled();
        queue.schedule(DeferredAction::ShowResults, 0.0);
        queue.bump_epoch();
        assert!(queue.take_scheduled().is_empty());
        assert!(old.iter().all(|s| !queue.is_current(&s.ticket)));
    }

    #[test]
    fn test_negative_delay_clamped() {
        let mut queue = DeferredQueue::new();
        queue.schedule(DeferredAction::ShowResults, -5.0);
        assert_eq!(queue.take_scheduled()[0].delay_ms, 0.0);
    }
}
