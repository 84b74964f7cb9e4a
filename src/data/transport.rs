use std::io::Read;
use std::time::Duration;

use super::error::TransportError;

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking GET used by the fetcher. Any response with a status line is
/// `Ok`; only failures without one are `Err`.
pub trait Transport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

// ---------------------------------------------------------------------------
// ureq-backed transport
// ---------------------------------------------------------------------------

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = match self.agent.get(url).call() {
            Ok(resp) => resp,
            // ureq reports 4xx/5xx as errors; hand them back as responses.
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(t)) => {
                return Err(TransportError {
                    url: url.to_string(),
                    message: t.to_string(),
                })
            }
        };

        let status = response.status();
        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| TransportError {
                url: url.to_string(),
                message: format!("reading body: {e}"),
            })?;

        Ok(HttpResponse { status, body })
    }
}
