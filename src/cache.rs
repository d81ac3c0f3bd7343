//! Query and mutation cache.
//!
//! [`QueryCache`] maps a [`QueryKey`] to the last result fetched for it and
//! guarantees at most one in-flight fetch per key. It never performs I/O
//! itself: `query` hands a [`FetchTicket`] to a caller-supplied closure, and
//! the event loop feeds the outcome back through [`QueryCache::resolve`].
//! [`Mutation`] tracks a single write operation the same way.
//!
//! All methods take `&mut self` and are called from the UI thread only, so
//! reads and writes for a key are serialised without locks.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::ApiError;

/// How long an unused, settled entry is kept before eviction.
pub const CACHE_RETENTION: Duration = Duration::from_secs(5 * 60);

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

fn next_ticket_id() -> u64 {
    NEXT_TICKET.fetch_add(1, Ordering::Relaxed)
}

/// Identity of a cached query: resource name followed by its parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub const USERS: &'static str = "users";

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Key of the user list filtered by `term`.
    pub fn users(term: &str) -> Self {
        Self::new([Self::USERS, term])
    }

    /// Prefix matching every user list key.
    pub fn users_prefix() -> Self {
        Self::new([Self::USERS])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{s:?}")?;
        }
        write!(f, "]")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueryStatus {
    /// No result has arrived yet.
    Pending,
    Success,
    Error,
}

/// Snapshot of one cache entry handed to consumers.
#[derive(Clone, Debug)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub updated_at: Option<Instant>,
    pub is_fetching: bool,
}

impl<T> QueryState<T> {
    /// First load: nothing to show yet and a fetch is running.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending && self.is_fetching
    }
}

/// Handle for one issued fetch; returned to the cache on completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    id: u64,
    key: QueryKey,
}

impl FetchTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// Change notification drained by the event loop to decide on redraws.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheEvent {
    Changed(QueryKey),
}

#[derive(Debug)]
struct Entry<T> {
    data: Option<T>,
    error: Option<ApiError>,
    updated_at: Option<Instant>,
    in_flight: Option<u64>,
    stale: bool,
    subscribers: usize,
}

impl<T: Clone> Entry<T> {
    fn new() -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
            in_flight: None,
            stale: true,
            subscribers: 0,
        }
    }

    fn status(&self) -> QueryStatus {
        if self.error.is_some() {
            QueryStatus::Error
        } else if self.data.is_some() {
            QueryStatus::Success
        } else {
            QueryStatus::Pending
        }
    }

    fn snapshot(&self) -> QueryState<T> {
        QueryState {
            status: self.status(),
            data: self.data.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
            is_fetching: self.in_flight.is_some(),
        }
    }
}

pub struct QueryCache<T> {
    entries: HashMap<QueryKey, Entry<T>>,
    events: Vec<CacheEvent>,
}

impl<T: Clone> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> QueryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// Read `key`, calling `fetch` once if the entry is missing or stale and
    /// no fetch for it is already running.
    pub fn query<F>(&mut self, key: &QueryKey, fetch: F) -> QueryState<T>
    where
        F: FnOnce(FetchTicket),
    {
        let entry = self.entries.entry(key.clone()).or_insert_with(Entry::new);
        if entry.stale && entry.in_flight.is_none() {
            let id = next_ticket_id();
            entry.in_flight = Some(id);
            entry.stale = false;
            tracing::debug!(%key, ticket = id, "fetch issued");
            self.events.push(CacheEvent::Changed(key.clone()));
            fetch(FetchTicket { id, key: key.clone() });
        }
        entry.snapshot()
    }

    /// Manual retry: force a refetch of `key` unless one is already running.
    pub fn refetch<F>(&mut self, key: &QueryKey, fetch: F) -> QueryState<T>
    where
        F: FnOnce(FetchTicket),
    {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.stale = true;
        }
        self.query(key, fetch)
    }

    pub fn peek(&self, key: &QueryKey) -> Option<QueryState<T>> {
        self.entries.get(key).map(Entry::snapshot)
    }

    /// Store the outcome of a fetch. A failure keeps the previous data.
    ///
    /// Returns false when the key was evicted in the meantime.
    pub fn resolve(&mut self, ticket: FetchTicket, result: Result<T, ApiError>, now: Instant) -> bool {
        let Some(entry) = self.entries.get_mut(&ticket.key) else {
            tracing::debug!(key = %ticket.key, ticket = ticket.id, "dropping result for evicted key");
            return false;
        };
        if entry.in_flight == Some(ticket.id) {
            entry.in_flight = None;
        }
        match result {
            Ok(data) => {
                tracing::debug!(key = %ticket.key, ticket = ticket.id, "fetch succeeded");
                entry.data = Some(data);
                entry.error = None;
            }
            Err(err) => {
                tracing::warn!(key = %ticket.key, ticket = ticket.id, error = %err, "fetch failed");
                entry.error = Some(err);
            }
        }
        entry.updated_at = Some(now);
        self.events.push(CacheEvent::Changed(ticket.key));
        true
    }

    /// Mark every entry under `prefix` stale. Returns the keys with mounted
    /// subscribers; those refetch on their next `query`.
    pub fn invalidate(&mut self, prefix: &QueryKey) -> Vec<QueryKey> {
        let mut mounted = Vec::new();
        for (key, entry) in self.entries.iter_mut() {
            if !key.starts_with(prefix) {
                continue;
            }
            entry.stale = true;
            self.events.push(CacheEvent::Changed(key.clone()));
            if entry.subscribers > 0 {
                mounted.push(key.clone());
            }
        }
        tracing::info!(%prefix, refetching = mounted.len(), "queries invalidated");
        mounted
    }

    pub fn subscribe(&mut self, key: &QueryKey) {
        let entry = self.entries.entry(key.clone()).or_insert_with(Entry::new);
        entry.subscribers += 1;
    }

    pub fn unsubscribe(&mut self, key: &QueryKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
        }
    }

    pub fn subscribers(&self, key: &QueryKey) -> usize {
        self.entries.get(key).map_or(0, |e| e.subscribers)
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(|e| e.stale)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(|e| e.in_flight.is_some())
    }

    /// Evict entries nobody subscribes to whose last result is older than `max_age`.
    pub fn collect_garbage(&mut self, now: Instant, max_age: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, e| {
            let expired = e.subscribers == 0
                && e.in_flight.is_none()
                && e.updated_at.is_some_and(|t| now.saturating_duration_since(t) >= max_age);
            if expired {
                tracing::debug!(%key, "evicting unused query");
            }
            !expired
        });
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drain_events(&mut self) -> Vec<CacheEvent> {
        std::mem::take(&mut self.events)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MutationStatus {
    Idle,
    Pending,
    Success,
    Error,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MutationTicket(u64);

/// State of one write operation owned by a panel.
///
/// Independent of any query: a failed mutation never touches cached data.
#[derive(Debug)]
pub struct Mutation<V> {
    status: MutationStatus,
    variables: Option<V>,
    error: Option<ApiError>,
    current: Option<MutationTicket>,
}

impl<V> Default for Mutation<V> {
    fn default() -> Self {
        Self {
            status: MutationStatus::Idle,
            variables: None,
            error: None,
            current: None,
        }
    }
}

impl<V: Clone + PartialEq> Mutation<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the mutation: `run` is called exactly once with a fresh ticket.
    pub fn mutate<F>(&mut self, vars: V, run: F) -> MutationTicket
    where
        F: FnOnce(MutationTicket, V),
    {
        let ticket = MutationTicket(next_ticket_id());
        self.status = MutationStatus::Pending;
        self.error = None;
        self.variables = Some(vars.clone());
        self.current = Some(ticket);
        run(ticket, vars);
        ticket
    }

    /// Apply the completion for `ticket`. `on_success` runs only on success.
    ///
    /// Completions for any ticket but the latest are ignored; returns whether
    /// this one was applied.
    pub fn settle<R, F>(&mut self, ticket: MutationTicket, result: Result<R, ApiError>, on_success: F) -> bool
    where
        F: FnOnce(R),
    {
        if self.current != Some(ticket) {
            tracing::debug!(ticket = ticket.0, "ignoring superseded mutation result");
            return false;
        }
        self.current = None;
        match result {
            Ok(value) => {
                self.status = MutationStatus::Success;
                on_success(value);
            }
            Err(err) => {
                tracing::warn!(operation = %err.operation(), error = %err, "mutation failed");
                self.status = MutationStatus::Error;
                self.error = Some(err);
            }
        }
        true
    }

    pub fn status(&self) -> MutationStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == MutationStatus::Pending
    }

    pub fn is_pending_for(&self, vars: &V) -> bool {
        self.is_pending() && self.variables.as_ref() == Some(vars)
    }

    pub fn is_error(&self) -> bool {
        self.status == MutationStatus::Error
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn variables(&self) -> Option<&V> {
        self.variables.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;

    fn failed() -> ApiError {
        ApiError::request_failed(Operation::Fetch, "HTTP 500")
    }

    #[test]
    fn concurrent_queries_for_same_key_fetch_once() {
        let mut cache: QueryCache<Vec<u32>> = QueryCache::new();
        let key = QueryKey::users("");
        let mut issued = Vec::new();
        let first = cache.query(&key, |t| issued.push(t));
        let second = cache.query(&key, |t| issued.push(t));
        assert_eq!(issued.len(), 1);
        assert!(first.is_loading());
        assert!(second.is_loading());
    }

    #[test]
    fn resolved_entry_is_served_without_refetch() {
        let mut cache: QueryCache<Vec<u32>> = QueryCache::new();
        let key = QueryKey::users("");
        let mut issued = Vec::new();
        cache.query(&key, |t| issued.push(t));
        let ticket = issued.pop().unwrap();
        assert!(cache.resolve(ticket, Ok(vec![1, 2]), Instant::now()));

        let state = cache.query(&key, |t| issued.push(t));
        assert!(issued.is_empty());
        assert_eq!(state.status, QueryStatus::Success);
        assert_eq!(state.data, Some(vec![1, 2]));
    }

    #[test]
    fn invalidate_matches_prefix_only() {
        let mut cache: QueryCache<Vec<u32>> = QueryCache::new();
        let users = QueryKey::users("ann");
        let other = QueryKey::new(["posts", "ann"]);
        cache.subscribe(&users);
        for key in [&users, &other] {
            let mut issued = Vec::new();
            cache.query(key, |t| issued.push(t));
            cache.resolve(issued.pop().unwrap(), Ok(vec![]), Instant::now());
        }
        let mounted = cache.invalidate(&QueryKey::users_prefix());
        assert_eq!(mounted, vec![users.clone()]);
        assert!(cache.is_stale(&users));
        assert!(!cache.is_stale(&other));
    }

    #[test]
    fn invalidation_during_flight_triggers_one_follow_up() {
        let mut cache: QueryCache<Vec<u32>> = QueryCache::new();
        let key = QueryKey::users("");
        let mut issued = Vec::new();
        cache.query(&key, |t| issued.push(t));
        cache.invalidate(&QueryKey::users_prefix());
        cache.invalidate(&QueryKey::users_prefix());
        cache.query(&key, |t| issued.push(t));
        assert_eq!(issued.len(), 1, "no duplicate in-flight fetch");

        let first = issued.remove(0);
        cache.resolve(first, Ok(vec![1]), Instant::now());
        cache.query(&key, |t| issued.push(t));
        cache.query(&key, |t| issued.push(t));
        assert_eq!(issued.len(), 1);
    }

    #[test]
    fn failed_refetch_keeps_previous_data() {
        let mut cache: QueryCache<Vec<u32>> = QueryCache::new();
        let key = QueryKey::users("");
        let mut issued = Vec::new();
        cache.query(&key, |t| issued.push(t));
        cache.resolve(issued.pop().unwrap(), Ok(vec![7]), Instant::now());

        cache.refetch(&key, |t| issued.push(t));
        cache.resolve(issued.pop().unwrap(), Err(failed()), Instant::now());
        let state = cache.peek(&key).unwrap();
        assert_eq!(state.status, QueryStatus::Error);
        assert_eq!(state.data, Some(vec![7]));
        assert!(!state.is_fetching);
    }

    #[test]
    fn error_without_retry_does_not_refetch() {
        let mut cache: QueryCache<Vec<u32>> = QueryCache::new();
        let key = QueryKey::users("");
        let mut issued = Vec::new();
        cache.query(&key, |t| issued.push(t));
        cache.resolve(issued.pop().unwrap(), Err(failed()), Instant::now());
        cache.query(&key, |t| issued.push(t));
        assert!(issued.is_empty());
        cache.refetch(&key, |t| issued.push(t));
        assert_eq!(issued.len(), 1);
    }

    #[test]
    fn garbage_collection_spares_subscribed_and_recent_entries() {
        let mut cache: QueryCache<Vec<u32>> = QueryCache::new();
        let t0 = Instant::now();
        let kept = QueryKey::users("");
        let dropped = QueryKey::users("old");
        cache.subscribe(&kept);
        for key in [&kept, &dropped] {
            let mut issued = Vec::new();
            cache.query(key, |t| issued.push(t));
            cache.resolve(issued.pop().unwrap(), Ok(vec![]), t0);
        }
        assert_eq!(cache.collect_garbage(t0 + Duration::from_secs(60), CACHE_RETENTION), 0);
        assert_eq!(cache.collect_garbage(t0 + CACHE_RETENTION, CACHE_RETENTION), 1);
        assert!(cache.peek(&dropped).is_none());
        assert!(cache.peek(&kept).is_some());
    }

    #[test]
    fn result_for_evicted_key_is_dropped() {
        let mut cache: QueryCache<Vec<u32>> = QueryCache::new();
        let ticket = FetchTicket { id: 99, key: QueryKey::users("gone") };
        assert!(!cache.resolve(ticket, Ok(vec![]), Instant::now()));
        assert!(cache.is_empty());
    }

    #[test]
    fn mutation_runs_once_and_calls_on_success_only_on_success() {
        let mut m: Mutation<u64> = Mutation::new();
        let mut runs = 0;
        let ticket = m.mutate(42, |_, id| {
            assert_eq!(id, 42);
            runs += 1;
        });
        assert_eq!(runs, 1);
        assert!(m.is_pending_for(&42));
        assert!(!m.is_pending_for(&7));

        let mut called = false;
        assert!(m.settle(ticket, Err::<(), _>(failed()), |_| called = true));
        assert!(!called);
        assert!(m.is_error());

        let ticket = m.mutate(42, |_, _| {});
        assert!(m.error().is_none(), "new attempt clears the previous error");
        assert!(m.settle(ticket, Ok(()), |_| called = true));
        assert!(called);
        assert_eq!(m.status(), MutationStatus::Success);
    }

    #[test]
    fn superseded_mutation_ticket_is_ignored() {
        let mut m: Mutation<u64> = Mutation::new();
        let old = m.mutate(1, |_, _| {});
        let _new = m.mutate(2, |_, _| {});
        assert!(!m.settle(old, Ok(()), |_: ()| panic!("stale completion applied")));
        assert!(m.is_pending_for(&2));
    }

    #[test]
    fn query_key_display_lists_segments() {
        assert_eq!(QueryKey::users("ann").to_string(), r#"["users", "ann"]"#);
    }
}
