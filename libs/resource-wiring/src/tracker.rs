//! Lifecycle feed applying provider appear/disappear events to the registry.
//!
//! Events are applied by a single task in delivery order. The task stops
//! when its cancellation token fires or every [`ServiceTracker`] clone is
//! dropped; on stop it unregisters each provider it registered.

use std::collections::HashSet;
use std::sync::Arc;

use resource_wiring_sdk::{Properties, ProviderHandle, ProviderId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::registry::DynamicRegistry;

/// Notification from the host runtime about one provider.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    Appeared {
        handle: ProviderHandle,
        properties: Properties,
    },
    Disappeared {
        handle: ProviderHandle,
    },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("service tracker is closed")]
    Closed,
}

enum Message {
    Event(LifecycleEvent),
    Sync(oneshot::Sender<()>),
}

/// Sending side of the lifecycle feed. Cheap to clone.
#[derive(Clone)]
pub struct ServiceTracker {
    tx: mpsc::Sender<Message>,
}

impl ServiceTracker {
    /// Spawn the event loop for `registry`.
    ///
    /// The channel capacity is the registry's configured `event_buffer`.
    #[must_use]
    pub fn open(
        registry: Arc<DynamicRegistry>,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(registry.config().event_buffer.max(1));
        let task = tokio::spawn(run(registry, rx, cancel));
        (Self { tx }, task)
    }

    /// # Errors
    /// Returns `TrackerError::Closed` if the event loop has stopped.
    pub async fn appeared(
        &self,
        handle: ProviderHandle,
        properties: Properties,
    ) -> Result<(), TrackerError> {
        self.send(LifecycleEvent::Appeared { handle, properties }).await
    }

    /// # Errors
    /// Returns `TrackerError::Closed` if the event loop has stopped.
    pub async fn disappeared(&self, handle: ProviderHandle) -> Result<(), TrackerError> {
        self.send(LifecycleEvent::Disappeared { handle }).await
    }

    /// # Errors
    /// Returns `TrackerError::Closed` if the event loop has stopped.
    pub async fn send(&self, event: LifecycleEvent) -> Result<(), TrackerError> {
        self.tx
            .send(Message::Event(event))
            .await
            .map_err(|_| TrackerError::Closed)
    }

    /// Wait until every event sent before this call has been applied.
    ///
    /// # Errors
    /// Returns `TrackerError::Closed` if the event loop stopped first.
    pub async fn sync(&self) -> Result<(), TrackerError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Message::Sync(ack))
            .await
            .map_err(|_| TrackerError::Closed)?;
        done.await.map_err(|_| TrackerError::Closed)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

async fn run(
    registry: Arc<DynamicRegistry>,
    mut rx: mpsc::Receiver<Message>,
    cancel: CancellationToken,
) {
    info!("service tracker started");
    let mut live: HashSet<ProviderId> = HashSet::new();

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!("service tracker cancelled");
                break;
            }

            message = rx.recv() => match message {
                Some(Message::Event(event)) => apply(&registry, &mut live, event),
                Some(Message::Sync(ack)) => {
                    if ack.send(()).is_err() {
                        debug!("sync waiter went away");
                    }
                }
                None => {
                    debug!("all lifecycle senders dropped");
                    break;
                }
            },
        }
    }

    rx.close();
    let providers = live.len();
    for id in live {
        registry.remove_provider(id);
    }
    info!(providers, "service tracker stopped");
}

fn apply(registry: &DynamicRegistry, live: &mut HashSet<ProviderId>, event: LifecycleEvent) {
    match event {
        LifecycleEvent::Appeared { handle, properties } => {
            if registry.on_appeared(&handle, &properties).is_empty() {
                live.remove(&handle.id());
            } else {
                live.insert(handle.id());
            }
        }
        LifecycleEvent::Disappeared { handle } => {
            registry.on_disappeared(&handle);
            live.remove(&handle.id());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use resource_wiring_sdk::{Representable, TypeArguments};

    struct BlogPost;

    struct BlogPostings;

    impl Representable for BlogPostings {
        fn type_arguments(&self) -> TypeArguments {
            TypeArguments::new().bind::<BlogPost>().bind::<i64>()
        }

        fn name(&self) -> &str {
            "blog-postings"
        }
    }

    #[tokio::test]
    async fn events_are_applied_in_order() {
        let registry = Arc::new(DynamicRegistry::new());
        let (tracker, _task) =
            ServiceTracker::open(Arc::clone(&registry), CancellationToken::new());
        let handle = ProviderHandle::representable(Arc::new(BlogPostings));

        tracker.appeared(handle.clone(), Properties::new()).await.unwrap();
        tracker.sync().await.unwrap();
        assert!(registry.contains_provider(handle.id()));

        tracker.disappeared(handle.clone()).await.unwrap();
        tracker.sync().await.unwrap();
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn cancellation_unregisters_tracked_providers() {
        let registry = Arc::new(DynamicRegistry::new());
        let cancel = CancellationToken::new();
        let (tracker, task) = ServiceTracker::open(Arc::clone(&registry), cancel.clone());

        tracker
            .appeared(
                ProviderHandle::representable(Arc::new(BlogPostings)),
                Properties::new(),
            )
            .await
            .unwrap();
        tracker.sync().await.unwrap();
        assert_eq!(registry.len(), 1);

        cancel.cancel();
        task.await.unwrap();

        assert!(registry.is_empty());
        assert!(tracker.is_closed());
        assert_eq!(
            tracker
                .appeared(
                    ProviderHandle::representable(Arc::new(BlogPostings)),
                    Properties::new(),
                )
                .await,
            Err(TrackerError::Closed)
        );
    }

    #[tokio::test]
    async fn dropping_every_sender_stops_the_loop() {
        let registry = Arc::new(DynamicRegistry::new());
        let (tracker, task) =
            ServiceTracker::open(Arc::clone(&registry), CancellationToken::new());
        let other = tracker.clone();

        other
            .appeared(
                ProviderHandle::representable(Arc::new(BlogPostings)),
                Properties::new(),
            )
            .await
            .unwrap();
        drop(tracker);
        drop(other);
        task.await.unwrap();

        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn providers_registered_elsewhere_survive_shutdown() {
        let registry = Arc::new(DynamicRegistry::new());
        let direct = ProviderHandle::representable(Arc::new(BlogPostings));
        registry.on_appeared(&direct, &Properties::new());

        let cancel = CancellationToken::new();
        let (_tracker, task) = ServiceTracker::open(Arc::clone(&registry), cancel.clone());
        cancel.cancel();
        task.await.unwrap();

        assert!(registry.contains_provider(direct.id()));
    }
}
