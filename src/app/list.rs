//! "Users List" panel: search, table window, and the delete action.

use std::time::Instant;

use crate::api::User;
use crate::app::requests::Requests;
use crate::cache::{Mutation, MutationTicket, QueryCache, QueryKey, QueryState, QueryStatus};
use crate::error::ApiError;
use crate::pagination::Pagination;
use crate::search::SearchBox;

/// What the table area should show.
#[derive(Debug, PartialEq, Eq)]
pub enum ListView<'a> {
    Loading,
    Error { message: &'a str, retrying: bool },
    NoResults { term: &'a str },
    Rows { rows: &'a [User], total: usize },
}

#[derive(Debug)]
pub struct ListPanel {
    pub search: SearchBox,
    pub pagination: Pagination,
    /// Selected row, relative to the current page.
    pub selected: usize,
    delete: Mutation<u64>,
    subscribed: Option<QueryKey>,
    state: Option<QueryState<Vec<User>>>,
}

impl ListPanel {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: SearchBox::new(),
            pagination: Pagination::new(page_size),
            selected: 0,
            delete: Mutation::new(),
            subscribed: None,
            state: None,
        }
    }

    /// Read the current key through the cache, fetching if it is missing or stale.
    pub fn sync(&mut self, cache: &mut QueryCache<Vec<User>>, requests: &dyn Requests) {
        let key = self.resubscribe(cache);
        let term = self.search.effective().to_string();
        let state = cache.query(&key, |ticket| requests.fetch_users(ticket, term));
        self.apply(state);
    }

    /// Retry action of the error banner.
    pub fn retry(&mut self, cache: &mut QueryCache<Vec<User>>, requests: &dyn Requests) {
        let key = self.resubscribe(cache);
        let term = self.search.effective().to_string();
        tracing::info!(%key, "retrying user list");
        let state = cache.refetch(&key, |ticket| requests.fetch_users(ticket, term));
        self.apply(state);
    }

    fn resubscribe(&mut self, cache: &mut QueryCache<Vec<User>>) -> QueryKey {
        let key = self.search.query_key();
        if self.subscribed.as_ref() != Some(&key) {
            if let Some(old) = self.subscribed.take() {
                cache.unsubscribe(&old);
            }
            cache.subscribe(&key);
            self.subscribed = Some(key.clone());
        }
        key
    }

    fn apply(&mut self, state: QueryState<Vec<User>>) {
        let total = state.data.as_ref().map_or(0, Vec::len);
        self.pagination.clamp(total);
        let visible = self.pagination.window(total).len();
        self.selected = self.selected.min(visible.saturating_sub(1));
        self.state = Some(state);
    }

    /// Advance the search debounce; a newly settled term starts from page one.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.search.poll(now) {
            Some(term) => {
                tracing::debug!(%term, "search term settled");
                self.pagination.first_page();
                self.selected = 0;
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> ListView<'_> {
        let Some(state) = &self.state else {
            return ListView::Loading;
        };
        match state.status {
            QueryStatus::Pending => ListView::Loading,
            QueryStatus::Error => ListView::Error {
                message: state.error.as_ref().map_or("", ApiError::message),
                retrying: state.is_fetching,
            },
            QueryStatus::Success => {
                let users = self.users();
                if users.is_empty() && !self.search.effective().trim().is_empty() {
                    ListView::NoResults { term: self.search.effective() }
                } else {
                    ListView::Rows { rows: self.pagination.slice(users), total: users.len() }
                }
            }
        }
    }

    /// Full result set of the current query, before pagination.
    pub fn users(&self) -> &[User] {
        self.state
            .as_ref()
            .and_then(|s| s.data.as_deref())
            .unwrap_or(&[])
    }

    pub fn page_rows(&self) -> &[User] {
        self.pagination.slice(self.users())
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.is_fetching)
    }

    pub fn is_error(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.status == QueryStatus::Error)
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.page_rows().get(self.selected)
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.page_rows().len() {
            self.selected += 1;
        }
    }

    pub fn next_page(&mut self) {
        if self.pagination.next_page(self.users().len()) {
            self.selected = 0;
        }
    }

    pub fn prev_page(&mut self) {
        if self.pagination.prev_page() {
            self.selected = 0;
        }
    }

    pub fn cycle_page_size(&mut self) {
        self.pagination.cycle_page_size();
        self.selected = 0;
    }

    /// Delete controls are busy while any delete is in flight.
    pub fn can_delete(&self) -> bool {
        !self.delete.is_pending()
    }

    pub fn is_deleting(&self, id: u64) -> bool {
        self.delete.is_pending_for(&id)
    }

    /// Issue the delete for a confirmed target. Refused while another is pending.
    pub fn confirm_delete(&mut self, target: &User, requests: &dyn Requests) -> bool {
        if !self.can_delete() {
            tracing::warn!(id = target.id, "delete refused; another delete is pending");
            return false;
        }
        self.delete.mutate(target.id, |ticket, id| requests.delete_user(ticket, id));
        true
    }

    pub fn settle_delete(
        &mut self,
        ticket: MutationTicket,
        result: Result<(), ApiError>,
        cache: &mut QueryCache<Vec<User>>,
    ) -> bool {
        let id = self.delete.variables().copied();
        self.delete.settle(ticket, result, |()| {
            tracing::info!(id, "user deleted");
            cache.invalidate(&QueryKey::users_prefix());
        })
    }

    pub fn delete_error(&self) -> Option<&ApiError> {
        self.delete.error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::requests::testing::Recording;

    fn user(id: u64) -> User {
        User { id, name: format!("U{id}"), email: format!("u{id}@x.io"), company: None }
    }

    #[test]
    fn loading_then_rows_then_clamped_after_shrink() {
        let rec = Recording::default();
        let mut cache = QueryCache::new();
        let mut list = ListPanel::new(5);
        list.sync(&mut cache, &rec);
        assert_eq!(list.view(), ListView::Loading);

        let (ticket, _) = rec.fetches.borrow_mut().pop().unwrap();
        cache.resolve(ticket, Ok((1..=7).map(user).collect()), Instant::now());
        list.sync(&mut cache, &rec);
        list.next_page();
        assert_eq!(list.page_rows().len(), 2);

        cache.invalidate(&QueryKey::users_prefix());
        list.sync(&mut cache, &rec);
        let (ticket, _) = rec.fetches.borrow_mut().pop().unwrap();
        cache.resolve(ticket, Ok((1..=3).map(user).collect()), Instant::now());
        list.sync(&mut cache, &rec);
        assert_eq!(list.pagination.page_index(), 0);
        assert_eq!(list.page_rows().len(), 3);
    }

    #[test]
    fn second_delete_refused_while_pending() {
        let rec = Recording::default();
        let mut list = ListPanel::new(5);
        assert!(list.confirm_delete(&user(42), &rec));
        assert!(list.is_deleting(42));
        assert!(!list.confirm_delete(&user(42), &rec));
        assert!(!list.confirm_delete(&user(7), &rec));
        assert_eq!(rec.mutations.borrow().len(), 1);
    }
}
