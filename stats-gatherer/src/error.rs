use crate::extract::PageKind;
use std::path::PathBuf;
use url::Url;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can end a collection cycle early. None of these are retried within the cycle.
#[derive(thiserror::Error, Debug)]
pub enum CollectError {
    #[error("Building the HTTP client failed: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Logging in at {url} failed: {source}")]
    Login {
        url: Url,
        #[source]
        source: BoxError,
    },

    #[error("Fetching {url} failed: {source}")]
    Fetch {
        url: Url,
        #[source]
        source: BoxError,
    },

    #[error("The {page} page has no `{field}` counter")]
    MissingField { page: PageKind, field: &'static str },

    #[error("Expected counters from the {expected} page but got the {found} page")]
    UnexpectedPage { expected: PageKind, found: PageKind },

    #[error("Encoding the snapshot row failed: {0}")]
    Encode(#[from] csv::Error),

    #[error("Appending to {path:?} failed: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
