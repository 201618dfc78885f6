use async_trait::async_trait;
use super::IndicatorSource;
use super::econdata::decode_series;
use crate::error::{FetchError, FetchResult};
use crate::models::SeriesBundle;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

enum MemoryEntry {
    Bundle(SeriesBundle),
    Status(u16),
}

/// Offline source serving canned bundles; records every requested code.
#[derive(Default)]
pub struct MemorySource {
    entries: HashMap<String, MemoryEntry>,
    calls: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve every decodable entry of an `/econdata`-shaped document.
    pub fn from_response(json: &Value) -> Self {
        let mut source = Self::new();
        if let Some(map) = json.as_object() {
            for code in map.keys() {
                if let Ok(bundle) = decode_series(json, code) {
                    source = source.with_bundle(bundle);
                }
            }
        }
        source
    }

    pub fn with_bundle(mut self, bundle: SeriesBundle) -> Self {
        self.entries.insert(bundle.code.to_uppercase(), MemoryEntry::Bundle(bundle));
        self
    }

    /// Answer `code` with a non-success HTTP status.
    pub fn with_status(mut self, code: &str, status: u16) -> Self {
        self.entries.insert(code.to_uppercase(), MemoryEntry::Status(status));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, code: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == code).count()
    }
}

#[async_trait]
impl IndicatorSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_series(&self, code: &str) -> FetchResult<SeriesBundle> {
        let code = code.trim().to_uppercase();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(code.clone());
        }

        match self.entries.get(&code) {
            Some(MemoryEntry::Bundle(bundle)) => Ok(bundle.clone()),
            Some(MemoryEntry::Status(status)) => Err(FetchError::Transport { code, status: *status }),
            None => Err(FetchError::EmptyResult { code }),
        }
    }
}
