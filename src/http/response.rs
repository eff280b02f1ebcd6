use crate::domain::Message;
use crate::error::HarnessError;

/// Result of one HTTP call. The body stays raw text until a caller asks for
/// it to be parsed.
#[derive(Debug, Clone)]
pub struct ResponseOutcome {
    pub status_code: u16,
    /// `"<version> <code> <reason>"`, e.g. `HTTP/1.1 200 OK`.
    pub status_line: String,
    pub body: String,
    pub duration_ms: u128,
}

impl ResponseOutcome {
    /// Parse the body as a JSON array of messages.
    pub fn messages(&self) -> Result<Vec<Message>, HarnessError> {
        Message::list_from_json(&self.body)
    }
}
