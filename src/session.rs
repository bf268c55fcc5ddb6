//! Session state of the lookup form.
//!
//! `SessionState` is an immutable value. Every event produces a new state
//! through one of the `apply_*` functions, so the form's state machine can be
//! driven and checked without a terminal:
//!
//! ```text
//! Idle --submit(bad)--> Invalid --submit(ok)--> Loading
//! Loading --success--> ResultsShown   (form hidden for good)
//! Loading --failure--> FetchFailed    (form still shown)
//! ```
//!
//! At most one request is outstanding. `apply_submit` refuses to start a
//! second one while `in_flight` is set or once the form has been hidden, and
//! responses carrying any other request id are dropped.

use crate::error::{ValidationError, FETCH_MESSAGE};
use crate::post_office::PostOffice;
use crate::query::LookupQuery;
use strum::Display;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    Idle,
    Invalid,
    Loading,
    FetchFailed,
    ResultsShown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input failed validation, nothing was sent.
    Rejected(ValidationError),
    /// Issue exactly one request for this query.
    Fetch { request_id: u64, query: LookupQuery },
    /// The form is hidden or a request is already running.
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    query: String,
    is_loading: bool,
    error_message: Option<String>,
    all_records: Vec<PostOffice>,
    visible_records: Vec<PostOffice>,
    has_searched_once: bool,
    filter_enabled: bool,
    filter_term: String,
    in_flight: Option<u64>,
    next_request_id: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn all_records(&self) -> &[PostOffice] {
        &self.all_records
    }

    pub fn visible_records(&self) -> &[PostOffice] {
        &self.visible_records
    }

    pub fn has_searched_once(&self) -> bool {
        self.has_searched_once
    }

    pub fn filter_term(&self) -> &str {
        &self.filter_term
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn form_visible(&self) -> bool {
        !self.has_searched_once
    }

    pub fn filter_visible(&self) -> bool {
        self.filter_enabled
    }

    pub fn found_message(&self) -> String {
        format!("Number of pincode(s) found: {}", self.all_records.len())
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.filter_enabled {
            Phase::ResultsShown
        } else if self.error_message.as_deref() == Some(FETCH_MESSAGE) {
            Phase::FetchFailed
        } else if self.error_message.is_some() {
            Phase::Invalid
        } else {
            Phase::Idle
        }
    }

    pub fn apply_submit(&self, raw: &str) -> (SessionState, SubmitOutcome) {
        if self.has_searched_once || self.in_flight.is_some() {
            debug!("Ignoring submit of {raw:?} in phase {}", self.phase());
            return (self.clone(), SubmitOutcome::Ignored);
        }

        match LookupQuery::parse(raw) {
            Err(err) => {
                let next = SessionState {
                    query: raw.to_string(),
                    is_loading: false,
                    error_message: Some(err.to_string()),
                    all_records: Vec::new(),
                    visible_records: Vec::new(),
                    filter_enabled: false,
                    ..self.clone()
                };
                (next, SubmitOutcome::Rejected(err))
            }
            Ok(query) => {
                let request_id = self.next_request_id;
                let next = SessionState {
                    query: raw.to_string(),
                    is_loading: true,
                    error_message: None,
                    in_flight: Some(request_id),
                    next_request_id: request_id + 1,
                    ..self.clone()
                };
                (next, SubmitOutcome::Fetch { request_id, query })
            }
        }
    }

    pub fn apply_fetch_success(&self, request_id: u64, records: Vec<PostOffice>) -> SessionState {
        if !self.is_current(request_id) {
            return self.clone();
        }
        SessionState {
            is_loading: false,
            error_message: None,
            visible_records: records.clone(),
            all_records: records,
            has_searched_once: true,
            filter_enabled: true,
            filter_term: String::new(),
            in_flight: None,
            ..self.clone()
        }
    }

    pub fn apply_fetch_failure(&self, request_id: u64) -> SessionState {
        if !self.is_current(request_id) {
            return self.clone();
        }
        SessionState {
            is_loading: false,
            error_message: Some(FETCH_MESSAGE.to_string()),
            all_records: Vec::new(),
            visible_records: Vec::new(),
            filter_enabled: false,
            in_flight: None,
            ..self.clone()
        }
    }

    /// Leave the loading state without recording an error.
    pub fn apply_fetch_cancelled(&self, request_id: u64) -> SessionState {
        if !self.is_current(request_id) {
            return self.clone();
        }
        SessionState {
            is_loading: false,
            in_flight: None,
            ..self.clone()
        }
    }

    pub fn apply_filter(&self, term: &str) -> SessionState {
        let visible_records = self
            .all_records
            .iter()
            .filter(|r| r.matches(term))
            .cloned()
            .collect();
        SessionState {
            visible_records,
            filter_term: term.to_string(),
            ..self.clone()
        }
    }

    fn is_current(&self, request_id: u64) -> bool {
        if self.in_flight == Some(request_id) {
            true
        } else {
            warn!(
                "Dropping response for request {request_id}, in flight: {:?}",
                self.in_flight
            );
            false
        }
    }
}
