use std::time::Duration;

use farefinder_core::{CoreResult, LocationCandidate, Operation, TravelDataSource};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::debounce::Debouncer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Origin,
    Destination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// Issued for every lookup. Only the most recent ticket's response is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub seq: u64,
    pub keyword: String,
}

/// One autocomplete location input. Origin and destination are two instances.
#[derive(Debug, Clone)]
pub struct LocationField {
    role: FieldRole,
    text: String,
    selected: Option<LocationCandidate>,
    candidates: Vec<LocationCandidate>,
    open: bool,
    highlighted: Option<usize>,
    loading: bool,
    error: Option<String>,
    debouncer: Debouncer,
    issued: u64,
}

impl LocationField {
    pub fn new(role: FieldRole, debounce: Duration) -> Self {
        Self {
            role,
            text: String::new(),
            selected: None,
            candidates: Vec::new(),
            open: false,
            highlighted: None,
            loading: false,
            error: None,
            debouncer: Debouncer::new(debounce),
            issued: 0,
        }
    }

    pub fn role(&self) -> FieldRole {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selected(&self) -> Option<&LocationCandidate> {
        self.selected.as_ref()
    }

    pub fn candidates(&self) -> &[LocationCandidate] {
        &self.candidates
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The user typed. Editing away from a selected name drops the selection.
    pub fn input(&mut self, raw: &str, now: Instant) {
        self.text = raw.to_string();

        if self.selected.as_ref().map(|s| s.name != raw).unwrap_or(false) {
            debug!("{:?} selection dropped by edit", self.role);
            self.selected = None;
        }

        self.debouncer.push(raw, now);
        if raw.is_empty() {
            self.set_open(false);
        }
    }

    /// Advance the debounce clock. Returns the keyword to look up, if any.
    pub fn tick(&mut self, now: Instant) -> Option<String> {
        self.debouncer.poll(now);
        self.pending_keyword()
    }

    /// Wait out the debounce delay, then return the keyword to look up, if any.
    pub async fn settle(&mut self) -> Option<String> {
        self.debouncer.wait().await;
        self.pending_keyword()
    }

    /// The settled keyword, if a lookup is allowed right now: something settled,
    /// the field still has text, and nothing is selected yet.
    pub fn pending_keyword(&self) -> Option<String> {
        let keyword = self.debouncer.settled().trim();
        if keyword.is_empty() || self.text.trim().is_empty() || self.selected.is_some() {
            return None;
        }
        Some(keyword.to_string())
    }

    pub fn begin_lookup(&mut self) -> Option<LookupTicket> {
        let keyword = self.pending_keyword()?;
        self.issued += 1;
        self.loading = true;
        self.error = None;
        debug!("{:?} lookup #{} for {:?}", self.role, self.issued, keyword);
        Some(LookupTicket { seq: self.issued, keyword })
    }

    /// Apply a lookup result. Responses to superseded tickets are dropped.
    /// A failure keeps the previous candidates.
    pub fn complete_lookup(
        &mut self,
        ticket: LookupTicket,
        result: CoreResult<Vec<LocationCandidate>>,
    ) -> bool {
        if ticket.seq != self.issued {
            warn!(
                "{:?} dropping stale lookup #{} ({:?}), latest is #{}",
                self.role, ticket.seq, ticket.keyword, self.issued
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(candidates) => {
                debug!(
                    "{:?} lookup #{} returned {} candidates",
                    self.role,
                    ticket.seq,
                    candidates.len()
                );
                self.candidates = candidates;
                // Indexes into the old list mean nothing now
                self.highlighted = None;
                let visible = !self.candidates.is_empty()
                    && !self.text.is_empty()
                    && self.selected.is_none();
                self.set_open(visible);
            }
            Err(err) => {
                warn!("{:?} lookup #{} failed: {}", self.role, ticket.seq, err);
                self.error = Some(err.display_message(Operation::FetchLocations));
            }
        }
        true
    }

    /// Look up the settled keyword against `source`. Returns whether candidates were applied.
    pub async fn resolve(&mut self, source: &dyn TravelDataSource) -> bool {
        let Some(ticket) = self.begin_lookup() else {
            return false;
        };
        let result = source.search_locations(&ticket.keyword).await;
        self.complete_lookup(ticket, result)
    }

    pub fn select(&mut self, index: usize) -> Option<LocationCandidate> {
        let candidate = self.candidates.get(index)?.clone();
        Some(self.select_candidate(candidate))
    }

    /// Commit a candidate. The field shows its name; the caller gets the structured value.
    pub fn select_candidate(&mut self, candidate: LocationCandidate) -> LocationCandidate {
        self.candidates.clear();
        self.text = candidate.name.clone();
        self.selected = Some(candidate.clone());
        self.set_open(false);
        self.debouncer.cancel();
        self.abandon_lookups();
        debug!("{:?} selected {}", self.role, candidate.iata_code);
        candidate
    }

    /// Reset text, selection and candidates together.
    pub fn clear(&mut self) {
        self.text.clear();
        self.selected = None;
        self.candidates.clear();
        self.error = None;
        self.set_open(false);
        self.debouncer.reset();
        self.abandon_lookups();
    }

    pub fn set_open(&mut self, open: bool) {
        if !open {
            self.highlighted = None;
        }
        self.open = open;
    }

    /// Keyboard navigation over the open list. Returns a candidate when Enter commits one.
    pub fn handle_key(&mut self, key: NavKey) -> Option<LocationCandidate> {
        let count = self.candidates.len();
        match key {
            NavKey::ArrowDown if self.open && count > 0 => {
                self.highlighted = Some(match self.highlighted {
                    Some(i) => (i + 1) % count,
                    None => 0,
                });
                None
            }
            NavKey::ArrowUp if self.open && count > 0 => {
                self.highlighted = Some(match self.highlighted {
                    Some(i) => (i + count - 1) % count,
                    None => count - 1,
                });
                None
            }
            NavKey::Enter if self.open => {
                let index = self.highlighted?;
                self.select(index)
            }
            NavKey::Escape => {
                self.set_open(false);
                None
            }
            _ => None,
        }
    }

    /// Exchange everything but the role with `other`.
    pub fn swap_with(&mut self, other: &mut LocationField) {
        std::mem::swap(self, other);
        std::mem::swap(&mut self.role, &mut other.role);
    }

    // In-flight responses become stale and the spinner stops.
    fn abandon_lookups(&mut self) {
        self.issued += 1;
        self.loading = false;
    }
}
