//! "Edit User" dialog.

use std::time::{Duration, Instant};

use crate::api::{Draft, User};
use crate::app::FormFocus;
use crate::app::requests::Requests;
use crate::cache::{Mutation, MutationTicket, QueryCache, QueryKey};
use crate::error::ApiError;
use crate::timer::ScopedTimer;
use crate::validate;

/// Delay between a successful update and the dialog closing itself.
pub const EDIT_CLOSE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug)]
pub struct EditOverlay {
    user: User,
    pub draft: Draft,
    pub focus: FormFocus,
    mutation: Mutation<(u64, Draft)>,
    show_success: bool,
    close_timer: ScopedTimer,
}

impl EditOverlay {
    pub fn new(user: User) -> Self {
        Self {
            draft: Draft::from_user(&user),
            user,
            focus: FormFocus::Name,
            mutation: Mutation::new(),
            show_success: false,
            close_timer: ScopedTimer::new(),
        }
    }

    /// Point the dialog at `user`, resetting the draft if it is a different record.
    pub fn bind(&mut self, user: User) {
        if self.user != user {
            self.draft = Draft::from_user(&user);
            self.focus = FormFocus::Name;
            self.user = user;
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn can_submit(&self) -> bool {
        !self.mutation.is_pending() && validate::draft_is_valid(&self.draft)
    }

    pub fn submit(&mut self, requests: &dyn Requests) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.show_success = false;
        self.close_timer.cancel();
        self.mutation.mutate((self.user.id, self.draft.clone()), |ticket, (id, draft)| {
            requests.update_user(ticket, id, draft)
        });
        true
    }

    pub fn settle(
        &mut self,
        ticket: MutationTicket,
        result: Result<User, ApiError>,
        cache: &mut QueryCache<Vec<User>>,
        now: Instant,
    ) -> bool {
        self.mutation.settle(ticket, result, |user| {
            tracing::info!(id = user.id, "user updated");
            self.show_success = true;
            cache.invalidate(&QueryKey::users_prefix());
            self.close_timer.schedule(now, EDIT_CLOSE_DELAY);
        })
    }

    /// Closing is refused while the update is in flight.
    pub fn can_close(&self) -> bool {
        !self.mutation.is_pending()
    }

    /// True when the post-success delay has run out and the dialog should close.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.close_timer.fire(now) {
            self.show_success = false;
            return true;
        }
        false
    }

    pub fn show_success(&self) -> bool {
        self.show_success
    }

    pub fn is_pending(&self) -> bool {
        self.mutation.is_pending()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.mutation.error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::requests::testing::Recording;
    use crate::error::Operation;

    fn ann() -> User {
        User { id: 1, name: "Ann".into(), email: "ann@x.com".into(), company: None }
    }

    #[test]
    fn bind_keeps_draft_for_same_record() {
        let mut ov = EditOverlay::new(ann());
        ov.draft.name.push_str(" Lee");
        ov.bind(ann());
        assert_eq!(ov.draft.name, "Ann Lee");

        let mut renamed = ann();
        renamed.name = "Anna".into();
        ov.bind(renamed);
        assert_eq!(ov.draft, Draft::new("Anna", "ann@x.com"));
    }

    #[test]
    fn failed_update_keeps_dialog_open_with_error() {
        let rec = Recording::default();
        let mut cache = QueryCache::new();
        let mut ov = EditOverlay::new(ann());
        assert!(ov.submit(&rec));
        assert!(!ov.can_close());
        let ticket = rec.mutations.borrow_mut().pop().unwrap();
        let now = Instant::now();
        let err = ApiError::request_failed(Operation::Update, "HTTP 500");
        assert!(ov.settle(ticket, Err(err), &mut cache, now));
        assert!(ov.can_close());
        assert!(!ov.tick(now + EDIT_CLOSE_DELAY));
        assert_eq!(ov.error().map(ApiError::message), Some("Failed to update user (HTTP 500)"));
        assert_eq!(ov.draft, Draft::from_user(&ann()));
    }
}
