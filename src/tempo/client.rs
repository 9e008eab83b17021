//! Transport contract for the companion playback service

use core::fmt;

use embassy_time::Duration;

/// A single playback request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackRequest<'a> {
    /// Fixed service URL
    pub endpoint: &'a str,
    /// The transport must give up after this long
    pub timeout: Duration,
}

/// Response head; the body was written into the caller's buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackResponse {
    /// HTTP status code
    pub status: u16,
    /// Number of body bytes written
    pub body_len: usize,
}

impl PlaybackResponse {
    pub const fn new(status: u16, body_len: usize) -> Self {
        Self { status, body_len }
    }

    /// Returns if the status is in the 2xx range
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Why a poll produced no snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// No response within the request timeout
    Timeout,
    /// Connection could not be made or broke mid-request
    Transport,
    /// Service answered with a non-success status
    Status(u16),
    /// Service answered with nothing to parse
    EmptyBody,
    /// Body did not fit the receive buffer
    BodyTooLarge,
    /// Body is not valid UTF-8
    InvalidUtf8,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Transport => write!(f, "transport failure"),
            FetchError::Status(code) => write!(f, "unexpected status {}", code),
            FetchError::EmptyBody => write!(f, "empty response body"),
            FetchError::BodyTooLarge => write!(f, "response body too large"),
            FetchError::InvalidUtf8 => write!(f, "response body is not utf-8"),
        }
    }
}

/// Blocking playback transport
///
/// Implementations issue `GET request.endpoint`, write the body into `body`
/// and return within `request.timeout`.
pub trait PlaybackClient {
    fn get(
        &mut self,
        request: &PlaybackRequest<'_>,
        body: &mut [u8],
    ) -> Result<PlaybackResponse, FetchError>;
}

/// Non-blocking playback transport for a dedicated poll task
pub trait AsyncPlaybackClient {
    fn get(
        &mut self,
        request: &PlaybackRequest<'_>,
        body: &mut [u8],
    ) -> impl Future<Output = Result<PlaybackResponse, FetchError>>;
}
