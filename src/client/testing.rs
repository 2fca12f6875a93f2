//! In-memory transport for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::transport::{
    Operation, RawResponse, Transport, TransportError, TransportErrorKind,
};

type Reply = std::result::Result<RawResponse, TransportError>;

/// Replays queued replies in order and records every request it sees.
///
/// When the queue runs dry the last reply is repeated, so "always fail"
/// scripts need a single entry.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    requests: Mutex<Vec<Operation>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn json(self, status: u16, body: Value) -> Self {
        self.reply(Ok(RawResponse {
            status,
            retry_after: None,
            body: body.to_string(),
        }))
    }

    pub fn status(self, status: u16) -> Self {
        self.reply(Ok(RawResponse {
            status,
            retry_after: None,
            body: format!("upstream failure {}", status),
        }))
    }

    pub fn rate_limited(self, retry_after: &str) -> Self {
        self.reply(Ok(RawResponse {
            status: 429,
            retry_after: Some(retry_after.to_string()),
            body: "too many requests".to_string(),
        }))
    }

    pub fn empty(self, status: u16) -> Self {
        self.reply(Ok(RawResponse {
            status,
            retry_after: None,
            body: String::new(),
        }))
    }

    pub fn connect_error(self) -> Self {
        self.reply(Err(TransportError::new(
            TransportErrorKind::Connect,
            "connection refused at 192.168.1.100:5678",
        )))
    }

    pub fn requests(&self) -> Vec<Operation> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, operation: &Operation) -> Reply {
        self.requests.lock().unwrap().push(operation.clone());

        let next = self.replies.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last
                .clone()
                .expect("ScriptedTransport has no scripted replies"),
        }
    }
}
