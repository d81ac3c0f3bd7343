//! Seam between the panel state machines and the network.
//!
//! Panels never await anything: they hand a ticket to [`Requests`] and the
//! outcome comes back later as a [`Completion`] on the event loop.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::api::{Draft, User, UserClient};
use crate::cache::{FetchTicket, MutationTicket};
use crate::error::ApiError;

/// Issues remote calls. Each method starts exactly one request.
pub trait Requests {
    fn fetch_users(&self, ticket: FetchTicket, search: String);
    fn create_user(&self, ticket: MutationTicket, draft: Draft);
    fn update_user(&self, ticket: MutationTicket, id: u64, draft: Draft);
    fn delete_user(&self, ticket: MutationTicket, id: u64);
}

/// Outcome of one remote call, routed back by its ticket.
#[derive(Debug)]
pub enum Completion {
    Fetched {
        ticket: FetchTicket,
        result: Result<Vec<User>, ApiError>,
    },
    Created {
        ticket: MutationTicket,
        result: Result<User, ApiError>,
    },
    Updated {
        ticket: MutationTicket,
        result: Result<User, ApiError>,
    },
    Deleted {
        ticket: MutationTicket,
        result: Result<(), ApiError>,
    },
}

/// Runs each call as a task on a tokio runtime and reports back over a channel.
pub struct TokioRequests {
    client: UserClient,
    handle: Handle,
    tx: UnboundedSender<Completion>,
}

impl TokioRequests {
    pub fn new(client: UserClient, handle: Handle) -> (Self, UnboundedReceiver<Completion>) {
        let (tx, rx) = unbounded_channel();
        (Self { client, handle, tx }, rx)
    }

    fn spawn<F>(&self, call: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let completion = call.await;
            if tx.send(completion).is_err() {
                tracing::debug!("event loop gone; dropping completion");
            }
        });
    }
}

impl Requests for TokioRequests {
    fn fetch_users(&self, ticket: FetchTicket, search: String) {
        let client = self.client.clone();
        self.spawn(async move {
            let result = client.fetch_users(&search).await;
            Completion::Fetched { ticket, result }
        });
    }

    fn create_user(&self, ticket: MutationTicket, draft: Draft) {
        let client = self.client.clone();
        self.spawn(async move {
            let result = client.create_user(&draft).await;
            Completion::Created { ticket, result }
        });
    }

    fn update_user(&self, ticket: MutationTicket, id: u64, draft: Draft) {
        let client = self.client.clone();
        self.spawn(async move {
            let result = client.update_user(id, &draft).await;
            Completion::Updated { ticket, result }
        });
    }

    fn delete_user(&self, ticket: MutationTicket, id: u64) {
        let client = self.client.clone();
        self.spawn(async move {
            let result = client.delete_user(id).await;
            Completion::Deleted { ticket, result }
        });
    }
}
