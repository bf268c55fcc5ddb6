use crate::cancel::RequestHandle;
use crate::error::{
    BodySnafu, CancelledSnafu, EmptyResponseSnafu, FetchError, HttpSnafu, ParseSnafu,
    StatusSnafu, TransportSnafu, WorkerGoneSnafu,
};
use crate::post_office::{PincodeResponse, PostOffice};
use crate::query::LookupQuery;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, error};
use ureq::{Agent, AgentBuilder, Error};

pub const URL_BASE: &str = "https://api.postalpincode.in/pincode";
const USER_AGENT: &str = concat!("pin-buddy/", env!("CARGO_PKG_VERSION"));
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Anything that can resolve a pincode to its post offices.
pub trait PincodeLookup {
    /// Issue exactly one lookup for `handle.query`.
    fn fetch(&self, handle: &RequestHandle) -> Result<Vec<PostOffice>, FetchError>;
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LookupOptions {
    pub api_base: String,
    /// No timeout unless set. A hung request can still be cancelled.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            api_base: URL_BASE.to_string(),
            timeout_secs: None,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Client {
    client: Agent,
    api_base: String,
}

impl Client {
    pub fn new(opts: &LookupOptions) -> Client {
        let mut builder = AgentBuilder::new().user_agent(&opts.user_agent);
        if let Some(secs) = opts.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Client {
            client: builder.build(),
            api_base: opts.api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, query: &LookupQuery) -> String {
        format!("{}/{}", self.api_base, query)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(&LookupOptions::default())
    }
}

impl PincodeLookup for Client {
    fn fetch(&self, handle: &RequestHandle) -> Result<Vec<PostOffice>, FetchError> {
        let url = self.url_for(&handle.query);
        debug!("Fetching {url} (request {})", handle.id);

        let (tx, rx) = mpsc::channel();
        let agent = self.client.clone();
        let worker_url = url.clone();
        thread::spawn(move || {
            // The receiver is gone if the request was cancelled
            let _ = tx.send(get(&agent, &worker_url));
        });

        loop {
            if handle.is_cancelled() {
                debug!("Request {} for {url} cancelled", handle.id);
                return CancelledSnafu {
                    query: handle.query.as_str(),
                }
                .fail();
            }
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(body) => return parse_body(&url, body?),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return WorkerGoneSnafu { url }.fail(),
            }
        }
    }
}

fn get(agent: &Agent, url: &str) -> Result<serde_json::Value, FetchError> {
    match agent.get(url).call() {
        Ok(response) => response.into_json::<serde_json::Value>().context(BodySnafu { url }),
        Err(Error::Status(code, response)) => {
            let body = response.into_string().unwrap_or_default();
            error!("{code} for {url}: {body}");
            HttpSnafu { url, status: code }.fail()
        }
        Err(err) => {
            let message = err.to_string();
            error!("{message}");
            TransportSnafu { url, message }.fail()
        }
    }
}

/// Decode the API's array body. Only element 0 is looked at.
pub fn parse_body(url: &str, body: serde_json::Value) -> Result<Vec<PostOffice>, FetchError> {
    let responses: Vec<PincodeResponse> =
        serde_json::from_value(body).context(ParseSnafu { url })?;
    let response = responses
        .into_iter()
        .next()
        .context(EmptyResponseSnafu { url })?;
    if !response.is_success() {
        return StatusSnafu {
            status: response.status,
            message: response.message,
        }
        .fail();
    }
    Ok(response.post_office.unwrap_or_default())
}
