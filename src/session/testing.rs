//! Scripted transport for unit tests

use super::transport::{FilePart, Transport};
use crate::{
    Error, Result,
    types::{ApiParams, ApiReply},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: &'static str,
    pub params: ApiParams,
}

/// Answers requests from a queue of canned replies and records every call
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Value>>,
    calls: Mutex<Vec<RecordedCall>>,
    probe_status: Mutex<u16>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Value>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            probe_status: Mutex::new(200),
        }
    }

    pub fn push(&self, reply: Value) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn set_probe_status(&self, status: u16) {
        *self.probe_status.lock().unwrap() = status;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// `action` (or `GET query` marker) of every call in order
    pub fn actions(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| format!("{} {}", c.method, c.params.action_name().unwrap_or("")))
            .collect()
    }

    fn answer(&self, method: &'static str, params: &ApiParams) -> Result<ApiReply> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            params: params.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .map(ApiReply::from_value)
            .ok_or_else(|| Error::internal(format!("no scripted reply for {method} {params:?}")))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, params: &ApiParams) -> Result<ApiReply> {
        self.answer("GET", params)
    }

    async fn post(&self, params: &ApiParams) -> Result<ApiReply> {
        self.answer("POST", params)
    }

    async fn post_multipart(&self, params: &ApiParams, _file: FilePart) -> Result<ApiReply> {
        self.answer("MULTIPART", params)
    }

    async fn probe(&self, _url: &str) -> Result<u16> {
        Ok(*self.probe_status.lock().unwrap())
    }
}
