// crates/quick-surveys-core/src/runtime/store.rs
// ============================================================================
// Module: Quick Surveys In-Memory Token Store
// Description: Simple in-memory survey token store for tests and dry runs.
// Purpose: Provide a token store implementation without external storage.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`SurveyTokenStore`]
//! for tests and the CLI dry run. Clones share the same map.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::interfaces::SurveyTokenStore;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory token store for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTokenStore {
    /// Token map protected by a mutex.
    tokens: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryTokenStore {
    /// Creates an empty token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with existing tokens.
    #[must_use]
    pub fn from_tokens(tokens: BTreeMap<String, String>) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(tokens)),
        }
    }

    /// Returns a copy of every stored token.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.tokens.lock().map(|tokens| tokens.clone()).unwrap_or_default()
    }
}

impl SurveyTokenStore for InMemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.tokens.lock().ok().and_then(|tokens| tokens.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.insert(key.to_string(), value.to_string());
        }
    }
}
