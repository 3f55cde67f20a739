use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum HttpError {
    #[error("HTTP status {status}")]
    Status { status: u16, detail: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl HttpError {
    pub(crate) fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Failures are terminal for the attempt; a new user action issues a new
// request. Timeouts cover connect, read and write.
pub(crate) fn get_text(
    url: &str,
    query: &[(String, String)],
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<String, HttpError> {
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(connect_timeout)
        .timeout_read(read_timeout)
        .timeout_write(read_timeout)
        .build();

    let mut request = agent.get(url);
    for (key, value) in query {
        request = request.query(key, value);
    }

    match request.call() {
        Ok(response) => response
            .into_string()
            .map_err(|err| HttpError::Decode(err.to_string())),
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().ok().unwrap_or_default();
            let detail = body.trim().chars().take(240).collect::<String>();
            Err(HttpError::Status { status, detail })
        }
        Err(ureq::Error::Transport(err)) => Err(HttpError::Transport(err.to_string())),
    }
}
