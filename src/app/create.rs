//! "Add New User" panel.

use std::time::{Duration, Instant};

use crate::api::{Draft, User};
use crate::app::FormFocus;
use crate::app::requests::Requests;
use crate::cache::{Mutation, MutationTicket, QueryCache, QueryKey};
use crate::error::ApiError;
use crate::timer::ScopedTimer;
use crate::validate;

/// How long the success banner stays up after a create.
pub const CREATE_SUCCESS_WINDOW: Duration = Duration::from_secs(3);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CreatePhase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Default)]
pub struct CreatePanel {
    pub draft: Draft,
    pub focus: FormFocus,
    mutation: Mutation<Draft>,
    show_success: bool,
    success_timer: ScopedTimer,
}

impl CreatePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CreatePhase {
        if self.mutation.is_pending() {
            CreatePhase::Submitting
        } else if self.show_success {
            CreatePhase::Succeeded
        } else if self.mutation.is_error() {
            CreatePhase::Failed
        } else {
            CreatePhase::Idle
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.mutation.is_pending() && validate::draft_is_valid(&self.draft)
    }

    /// Send the draft. Invalid drafts and submits while one is running are
    /// dropped silently; returns whether a request went out.
    pub fn submit(&mut self, requests: &dyn Requests) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.show_success = false;
        self.success_timer.cancel();
        self.mutation
            .mutate(self.draft.clone(), |ticket, draft| requests.create_user(ticket, draft));
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
            tracing::info!(id = user.id, name = %user.name, "user created");
            self.draft.clear();
            self.focus = FormFocus::Name;
            cache.invalidate(&QueryKey::users_prefix());
            self.show_success = true;
            self.success_timer.schedule(now, CREATE_SUCCESS_WINDOW);
        })
    }

    /// Hide the success banner once its window has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.success_timer.fire(now) {
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

    #[test]
    fn resubmit_hides_previous_success() {
        let rec = Recording::default();
        let mut cache = QueryCache::new();
        let mut panel = CreatePanel::new();
        panel.draft = Draft::new("Ann", "ann@x.com");
        assert!(panel.submit(&rec));
        assert_eq!(panel.phase(), CreatePhase::Submitting);
        let ticket = rec.mutations.borrow_mut().pop().unwrap();
        let t0 = Instant::now();
        let user = User { id: 11, name: "Ann".into(), email: "ann@x.com".into(), company: None };
        assert!(panel.settle(ticket, Ok(user), &mut cache, t0));
        assert_eq!(panel.phase(), CreatePhase::Succeeded);

        panel.draft = Draft::new("Bo", "bo@x.com");
        assert!(panel.submit(&rec));
        assert!(!panel.show_success());
        assert!(!panel.tick(t0 + CREATE_SUCCESS_WINDOW), "old banner timer cancelled");
    }
}
