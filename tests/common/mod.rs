//! Scripted oracle shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use affinity_quiz::clients::{Oracle, OracleError};

pub enum Reply {
    Text(String),
    Fail(OracleError),
    /// Sleep before answering; used to trip timeouts
    Slow(Duration, String),
}

/// Replays canned replies in order and records every prompt it receives.
#[derive(Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Reply::Text(t)) => Ok(t),
            Some(Reply::Fail(e)) => Err(e),
            Some(Reply::Slow(delay, t)) => {
                tokio::time::sleep(delay).await;
                Ok(t)
            }
            None => Err(OracleError::EmptyResponse),
        }
    }
}

/// A well-formed reply with one (adjustment, confidence) per dimension, in canonical order.
pub fn reply(values: [(f64, &str); 4]) -> String {
    let keys = [
        "emotional_depth",
        "relational_style",
        "values_alignment",
        "communication_style",
    ];
    let mut obj = serde_json::Map::new();
    for (key, (adjustment, confidence)) in keys.iter().zip(values) {
        obj.insert(
            key.to_string(),
            serde_json::json!({
                "analysis": format!("{key} analysis"),
                "adjustment": adjustment,
                "confidence": confidence
            }),
        );
    }
    serde_json::Value::Object(obj).to_string()
}
