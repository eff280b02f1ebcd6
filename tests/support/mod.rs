//! In-process stand-in for the message service.

#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use message_contract::config::EndpointMap;
use serde_json::{Value, json};
use tiny_http::{Header, Response, Server};

/// Ids below this are "tracked" by the stub, mirroring the live service
/// fixture state.
const TRACKED_BELOW: i64 = 1000;

/// A request the stub received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn path(&self) -> &str {
        self.url.split_once('?').map_or(self.url.as_str(), |(path, _)| path)
    }

    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, query)| query)
    }
}

pub struct StubService {
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    pub base_uri: String,
}

impl StubService {
    /// Serve every request with `handler`, which returns status and body.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Recorded) -> (u16, String) + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let (srv, log) = (Arc::clone(&server), Arc::clone(&requests));
        let handle = thread::spawn(move || {
            for mut request in srv.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let recorded = Recorded {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    content_type: request
                        .headers()
                        .iter()
                        .find(|header| header.field.equiv("Content-Type"))
                        .map(|header| header.value.as_str().to_string()),
                    body,
                };

                let (status, reply) = handler(&recorded);
                log.lock().unwrap().push(recorded);

                let has_body = !reply.is_empty();
                let mut response = Response::from_string(reply).with_status_code(status);
                if has_body {
                    response.add_header(
                        Header::from_bytes("Content-Type", "application/json").unwrap(),
                    );
                }
                let _ = request.respond(response);
            }
        });

        Self {
            server,
            handle: Some(handle),
            requests,
            base_uri: format!("http://{addr}/v3"),
        }
    }

    /// A stub that honors the whole contract for the default endpoint map.
    pub fn message_service() -> Self {
        Self::start(honest_contract(EndpointMap::default()))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubService {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Route requests the way the real service is documented to answer them.
pub fn honest_contract(endpoints: EndpointMap) -> impl Fn(&Recorded) -> (u16, String) + Send + 'static {
    move |request| {
        let path = request.path().trim_start_matches("/v3");
        if path == endpoints.send_message_success || path == endpoints.send_message_missing_field {
            let body: Value = serde_json::from_str(&request.body).unwrap_or(Value::Null);
            if body.get("id").is_some_and(Value::is_i64) {
                (200, String::new())
            } else {
                (400, String::new())
            }
        } else if path == endpoints.cancel_message_invalid_id || path == endpoints.cancel_message_valid_id {
            match request.query().and_then(|q| q.parse::<i64>().ok()) {
                Some(id) if id < TRACKED_BELOW => (200, String::new()),
                _ => (204, String::new()),
            }
        } else if path == endpoints.read_message {
            let body: Value = serde_json::from_str(&request.body).unwrap_or(Value::Null);
            match body["find"]["id"].as_i64() {
                Some(id) => (
                    200,
                    json!([
                        {"id": id, "text": "processed", "important": false},
                        {"id": id, "text": "processed again", "important": true}
                    ])
                    .to_string(),
                ),
                None => (400, String::new()),
            }
        } else {
            (404, String::new())
        }
    }
}
