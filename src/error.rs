// Error types for pin-buddy
//
// Both kinds are shown to the user as a fixed message. The variant detail of
// FetchError only goes to the log.

use snafu::Snafu;
use std::io;

pub const VALIDATION_MESSAGE: &str = "Please enter a valid 6-digit pincode.";
pub const FETCH_MESSAGE: &str = "Error fetching data. Please try again.";

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum ValidationError {
    #[snafu(display("Please enter a valid 6-digit pincode."))]
    InvalidPincode { input: String },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FetchError {
    // Transport and HTTP errors
    #[snafu(display("Error fetching data. Please try again."))]
    Http { url: String, status: u16 },
    #[snafu(display("Error fetching data. Please try again."))]
    Transport { url: String, message: String },
    #[snafu(display("Error fetching data. Please try again."))]
    WorkerGone { url: String },

    // Response body errors
    #[snafu(display("Error fetching data. Please try again."))]
    Body { url: String, source: io::Error },
    #[snafu(display("Error fetching data. Please try again."))]
    Parse {
        url: String,
        source: serde_json::Error,
    },
    #[snafu(display("Error fetching data. Please try again."))]
    EmptyResponse { url: String },
    #[snafu(display("Error fetching data. Please try again."))]
    Status {
        status: String,
        message: Option<String>,
    },

    #[snafu(display("Request for {query} was cancelled"))]
    Cancelled { query: String },
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled { .. })
    }

    /// What went wrong, for the log. The Display impl is what the user sees.
    pub fn detail(&self) -> String {
        match self {
            FetchError::Http { url, status } => format!("{status} for {url}"),
            FetchError::Transport { url, message } => format!("{url}: {message}"),
            FetchError::WorkerGone { url } => format!("request thread for {url} exited"),
            FetchError::Body { url, source } => format!("reading body of {url}: {source}"),
            FetchError::Parse { url, source } => format!("parsing {url}: {source}"),
            FetchError::EmptyResponse { url } => format!("{url} returned an empty array"),
            FetchError::Status { status, message } => match message {
                Some(message) => format!("status {status}: {message}"),
                None => format!("status {status}"),
            },
            FetchError::Cancelled { query } => format!("request for {query} cancelled"),
        }
    }
}
