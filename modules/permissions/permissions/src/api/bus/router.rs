use std::sync::Arc;

use bytes::Bytes;
use msgbus::{BusError, Incoming, MessageBus, Subscription};
use permissions_sdk::{PermissionsClient, subjects};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::handlers::{INTERNAL_ERROR_BODY, dispatch};

/// Serves the `permissions.*` subjects from a [`PermissionsClient`].
///
/// Every request runs in its own task, so a slow store call on one key does
/// not hold up other requests.
#[derive(Clone)]
pub struct RequestRouter {
    client: Arc<dyn PermissionsClient>,
}

impl RequestRouter {
    #[must_use]
    pub fn new(client: Arc<dyn PermissionsClient>) -> Self {
        Self { client }
    }

    /// Subscribe to every subject and answer requests until `shutdown` fires.
    ///
    /// On shutdown each subscription stops accepting requests, the ones
    /// already queued are dispatched, and every dispatched request is allowed
    /// to finish and reply.
    ///
    /// # Errors
    ///
    /// Returns the bus error if a subscription cannot be created. Nothing is
    /// served in that case.
    pub async fn serve(
        &self,
        bus: &dyn MessageBus,
        shutdown: CancellationToken,
    ) -> Result<(), BusError> {
        let mut subscriptions = Vec::with_capacity(subjects::ALL.len());
        for subject in subjects::ALL {
            subscriptions.push(bus.subscribe(subject).await?);
        }
        info!(subjects = ?subjects::ALL, "Permissions router listening");

        let mut listeners = JoinSet::new();
        for subscription in subscriptions {
            listeners.spawn(listen(self.client.clone(), subscription, shutdown.clone()));
        }

        while let Some(joined) = listeners.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Subject listener aborted");
            }
        }

        info!("Permissions router stopped");
        Ok(())
    }
}

async fn listen(
    client: Arc<dyn PermissionsClient>,
    mut subscription: Subscription,
    shutdown: CancellationToken,
) {
    let subject = subscription.subject().to_owned();
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            incoming = subscription.next() => {
                let Some(incoming) = incoming else {
                    warn!(subject = %subject, "Subscription closed by the bus");
                    break;
                };
                in_flight.spawn(handle_message(client.clone(), incoming));
            }
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }

    // Requests accepted by the bus before the close still get a reply.
    subscription.close();
    while let Some(incoming) = subscription.next().await {
        in_flight.spawn(handle_message(client.clone(), incoming));
    }
    drop(subscription);

    if !in_flight.is_empty() {
        debug!(subject = %subject, pending = in_flight.len(), "Draining in-flight requests");
    }
    while in_flight.join_next().await.is_some() {}
}

/// Answer one request. A panic inside the operation is turned into an
/// `internal_error` reply instead of leaving the requester to time out.
async fn handle_message(client: Arc<dyn PermissionsClient>, incoming: Incoming) {
    let subject = incoming.subject().to_owned();
    let payload = incoming.payload().clone();

    let task_subject = subject.clone();
    let worker = tokio::spawn(async move { dispatch(&*client, &task_subject, &payload).await });

    let reply = match worker.await {
        Ok(reply) => reply,
        Err(e) => {
            error!(subject = %subject, error = %e, "Request handler failed");
            Bytes::from_static(INTERNAL_ERROR_BODY)
        }
    };

    if let Err(e) = incoming.respond(reply).await {
        warn!(subject = %subject, error = %e, "Failed to deliver reply");
    }
}
