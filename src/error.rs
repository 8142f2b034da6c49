//! Error type shared by the coast lookup, tide providers and session cache.

use std::io;
use thiserror::Error;

/// Errors that can occur while resolving a position, talking to a remote
/// service, or touching the session cache.
///
/// Extremum selection and countdown ticking never fail and do not appear here.
#[derive(Error, Debug)]
pub enum TideError {
    /// HTTP request failed (network, TLS, or body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote service answered with a non-success status
    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    /// Provider answered but had no tide heights for the location
    #[error("no tide data available")]
    NoData,

    /// WorldTides was selected without an API key
    #[error("WorldTides API key is not configured")]
    MissingApiKey,

    /// No position on the command line, in the session, or in the config
    #[error("no position available: pass --lat/--lon or set [location] in the config")]
    NoPosition,

    /// Session file operations failed
    #[error("cache IO: {0}")]
    Cache(#[from] io::Error),

    /// Session record or response body was not valid JSON
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}
