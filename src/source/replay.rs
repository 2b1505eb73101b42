//! Scripted data source for driving the monitor in tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use brokerwatch_adapters::{AdapterError, RawObject};
use serde_json::Value;

use super::ObjectSource;

/// A source that replays a fixed sequence of fetch results.
///
/// Each call to `fetch` pops the next scripted response. Once the script is
/// exhausted every further fetch fails with a 503, which ends a running loop.
#[derive(Debug, Default)]
pub struct ReplaySource {
    responses: Mutex<VecDeque<Result<Vec<RawObject>, AdapterError>>>,
    targets: Mutex<Vec<Option<String>>>,
}

impl ReplaySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response built from JSON objects.
    pub fn respond(self, objects: Vec<Value>) -> Self {
        let objects = objects
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.push(Ok(objects))
    }

    /// Queue a failed response.
    pub fn fail(self, err: AdapterError) -> Self {
        self.push(Err(err))
    }

    fn push(self, response: Result<Vec<RawObject>, AdapterError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// The `target` argument of every fetch so far.
    pub fn targets(&self) -> Vec<Option<String>> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectSource for ReplaySource {
    async fn fetch(&self, target: Option<&str>) -> Result<Vec<RawObject>, AdapterError> {
        self.targets.lock().unwrap().push(target.map(str::to_owned));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AdapterError::Status {
                    status: 503,
                    url: "replay://exhausted".to_string(),
                })
            })
    }

    fn description(&self) -> &str {
        "replay"
    }
}
