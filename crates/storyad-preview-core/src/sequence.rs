//! Update ordering and per-update resource leases.
//!
//! Overlapping preview updates may complete out of order: a slow frame reload
//! from an older update can fire its `load` after a newer one. Every update
//! takes a ticket from the [`UpdateSequencer`]; an injection whose ticket is no
//! longer the latest one issued is discarded.
//!
//! Each update also mints one object URL for the ad document. The
//! [`LeaseLedger`] decides when that URL can be released: the URL of the
//! visible preview is held until a newer preview has landed.

use std::cell::Cell;
use std::rc::Rc;

/// Issues monotonically increasing update tickets.
#[derive(Debug, Clone, Default)]
pub struct UpdateSequencer {
    latest: Rc<Cell<u64>>,
}

impl UpdateSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket, making every previously issued ticket stale.
    pub fn issue(&self) -> UpdateTicket {
        let id = self.latest.get() + 1;
        self.latest.set(id);
        UpdateTicket {
            id,
            latest: Some(Rc::clone(&self.latest)),
        }
    }

    /// Id of the most recently issued ticket, 0 before the first.
    pub fn latest(&self) -> u64 {
        self.latest.get()
    }
}

/// Token identifying one update.
#[derive(Debug, Clone)]
pub struct UpdateTicket {
    id: u64,
    latest: Option<Rc<Cell<u64>>>,
}

impl UpdateTicket {
    /// A ticket that is always current, for callers outside any sequence.
    pub fn detached() -> Self {
        Self { id: 0, latest: None }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether no newer ticket has been issued by the same sequencer.
    pub fn is_current(&self) -> bool {
        match &self.latest {
            Some(latest) => latest.get() == self.id,
            None => true,
        }
    }
}

/// Tracks which update's object URL backs the visible preview.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaseLedger {
    visible: Option<(u64, String)>,
}

impl LeaseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that update `id` rendered using `url`.
    ///
    /// Returns the URL that is now unused and must be revoked: the previously
    /// visible one, or `url` itself if a newer update already landed.
    pub fn land(&mut self, id: u64, url: String) -> Option<String> {
        match self.visible.take() {
            Some((visible_id, visible_url)) if visible_id > id => {
                self.visible = Some((visible_id, visible_url));
                Some(url)
            }
            previous => {
                self.visible = Some((id, url));
                previous.map(|(_, url)| url)
            }
        }
    }

    /// URL of the visible preview, if any update has landed.
    pub fn visible(&self) -> Option<&str> {
        self.visible.as_ref().map(|(_, url)| url.as_str())
    }

    /// Release the visible lease, returning its URL for revocation.
    pub fn release(&mut self) -> Option<String> {
        self.visible.take().map(|(_, url)| url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let seq = UpdateSequencer::new();
        let first = seq.issue();
        assert!(first.is_current());

        let second = seq.issue();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.id() > first.id());
        assert_eq!(seq.latest(), second.id());
    }

    #[test]
    fn test_cloned_sequencer_shares_counter() {
        let seq = UpdateSequencer::new();
        let ticket = seq.issue();
        let _ = seq.clone().issue();
        assert!(!ticket.is_current());
    }

    #[test]
    fn test_detached_ticket_is_always_current() {
        let seq = UpdateSequencer::new();
        let detached = UpdateTicket::detached();
        seq.issue();
        assert!(detached.is_current());
    }

    #[test]
    fn test_first_landing_revokes_nothing() {
        let mut ledger = LeaseLedger::new();
        assert_eq!(ledger.land(1, "blob:1".into()), None);
        assert_eq!(ledger.visible(), Some("blob:1"));
    }

    #[test]
    fn test_landing_revokes_previous() {
        let mut ledger = LeaseLedger::new();
        ledger.land(1, "blob:1".into());
        assert_eq!(ledger.land(2, "blob:2".into()).as_deref(), Some("blob:1"));
        assert_eq!(ledger.visible(), Some("blob:2"));
    }

    #[test]
    fn test_late_landing_revokes_itself() {
        let mut ledger = LeaseLedger::new();
        ledger.land(3, "blob:3".into());
        assert_eq!(ledger.land(2, "blob:2".into()).as_deref(), Some("blob:2"));
        assert_eq!(ledger.visible(), Some("blob:3"));
    }

    #[test]
    fn test_release_empties_ledger() {
        let mut ledger = LeaseLedger::new();
        ledger.land(1, "blob:1".into());
        assert_eq!(ledger.release().as_deref(), Some("blob:1"));
        assert_eq!(ledger.release(), None);
    }
}
