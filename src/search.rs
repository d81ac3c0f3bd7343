//! Search box with a debounced effective term.
//!
//! Typing edits the raw text immediately (it is what the user sees); the term
//! used for the query key only follows after [`SEARCH_DEBOUNCE`] of quiet.

use std::time::{Duration, Instant};

use crate::cache::QueryKey;
use crate::timer::{Debounced, SEARCH_DEBOUNCE};

#[derive(Clone, Debug)]
pub struct SearchBox {
    term: Debounced<String>,
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBox {
    pub fn new() -> Self {
        Self::with_delay(SEARCH_DEBOUNCE)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { term: Debounced::new(String::new(), delay) }
    }

    /// Text as typed.
    pub fn text(&self) -> &str {
        self.term.raw()
    }

    /// Term the current query is keyed on.
    pub fn effective(&self) -> &str {
        self.term.settled()
    }

    pub fn query_key(&self) -> QueryKey {
        QueryKey::users(self.effective())
    }

    pub fn push(&mut self, c: char, now: Instant) {
        self.term.update(now, |s| s.push(c));
    }

    pub fn pop(&mut self, now: Instant) {
        self.term.update(now, |s| {
            s.pop();
        });
    }

    pub fn set(&mut self, text: &str, now: Instant) {
        self.term.set(text.to_string(), now);
    }

    pub fn clear(&mut self, now: Instant) {
        self.set("", now);
    }

    /// The new effective term, once the quiet period after the last edit ends.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        self.term.poll(now).cloned()
    }
}
