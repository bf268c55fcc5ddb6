use crate::cancel::{CancelSlot, RequestHandle};
use crate::client::PincodeLookup;
use crate::session::{SessionState, SubmitOutcome};
use tracing::{debug, info, warn};

/// Drives a `SessionState` with submit and filter events and runs the
/// lookup a valid submit asks for.
pub struct LookupForm<L: PincodeLookup> {
    lookup: L,
    state: SessionState,
    slot: CancelSlot,
}

impl<L: PincodeLookup> LookupForm<L> {
    pub fn new(lookup: L) -> Self {
        Self::with_slot(lookup, CancelSlot::new())
    }

    /// Each request installs a fresh token in `slot` while it runs, so
    /// `slot.cancel_current()` aborts that request and nothing after it.
    pub fn with_slot(lookup: L, slot: CancelSlot) -> Self {
        Self {
            lookup,
            state: SessionState::new(),
            slot,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn submit(&mut self, raw: &str) -> &SessionState {
        self.submit_with(raw, |_| {})
    }

    /// Like `submit`, calling `observe` with each state as it is committed:
    /// once after validation and again when the request resolves.
    pub fn submit_with<F>(&mut self, raw: &str, mut observe: F) -> &SessionState
    where
        F: FnMut(&SessionState),
    {
        let (state, outcome) = self.state.apply_submit(raw);
        self.state = state;
        observe(&self.state);

        let (request_id, query) = match outcome {
            SubmitOutcome::Fetch { request_id, query } => (request_id, query),
            SubmitOutcome::Rejected(err) => {
                debug!("Rejected {raw:?}: {err}");
                return &self.state;
            }
            SubmitOutcome::Ignored => return &self.state,
        };

        let handle = RequestHandle::new(request_id, query, self.slot.install());
        let result = self.lookup.fetch(&handle);
        self.slot.clear();
        self.state = match result {
            Ok(records) => {
                info!("Found {} post offices for {}", records.len(), handle.query);
                self.state.apply_fetch_success(request_id, records)
            }
            Err(err) if err.is_cancelled() => {
                info!("{}", err.detail());
                self.state.apply_fetch_cancelled(request_id)
            }
            Err(err) => {
                warn!("Lookup of {} failed: {}", handle.query, err.detail());
                self.state.apply_fetch_failure(request_id)
            }
        };
        observe(&self.state);
        &self.state
    }

    pub fn filter(&mut self, term: &str) -> &SessionState {
        self.state = self.state.apply_filter(term);
        debug!(
            "Filter {term:?} shows {} of {}",
            self.state.visible_records().len(),
            self.state.all_records().len()
        );
        &self.state
    }
}
