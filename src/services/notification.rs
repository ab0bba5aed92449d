//! Notification service implementation
//!
//! Notifications are persisted and then pushed onto the recipient's live
//! channel. Live channels are owned by a single hub task; callers talk to it
//! through a command queue and hold RAII [`Subscription`] handles.

use std::collections::HashMap;

use futures::Stream;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::database::repositories::NotificationRepository;
use crate::models::notification::{NewNotification, Notification, NotificationKind};
use crate::utils::errors::{BaropotError, Result};
use crate::utils::logging::log_notification_failure;

/// Per-user buffer of undelivered live notifications
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

enum HubCommand {
    Subscribe {
        user_id: i64,
        reply: oneshot::Sender<broadcast::Receiver<Notification>>,
    },
    Publish {
        notification: Notification,
    },
    Release {
        user_id: i64,
    },
    Stats {
        reply: oneshot::Sender<HubStats>,
    },
}

/// Snapshot of the live channel registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HubStats {
    pub users: usize,
    pub subscriptions: usize,
}

/// Handle to the live channel registry task
#[derive(Clone)]
pub struct NotificationHub {
    commands: mpsc::UnboundedSender<HubCommand>,
}

impl NotificationHub {
    /// Spawn the registry task on the current runtime
    pub fn spawn(capacity: usize) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        tokio::spawn(run_hub(inbox, capacity.max(1)));
        Self { commands }
    }

    /// Open a live subscription for the user
    pub async fn subscribe(&self, user_id: i64) -> Result<Subscription> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(HubCommand::Subscribe { user_id, reply })
            .map_err(|_| BaropotError::ServiceUnavailable("notification hub stopped".to_string()))?;

        let receiver = response
            .await
            .map_err(|_| BaropotError::ServiceUnavailable("notification hub stopped".to_string()))?;

        Ok(Subscription {
            user_id,
            receiver: Some(receiver),
            commands: self.commands.clone(),
        })
    }

    /// Push a notification to its recipient's live subscribers, if any
    pub fn publish(&self, notification: Notification) {
        if self.commands.send(HubCommand::Publish { notification }).is_err() {
            warn!("Notification hub stopped; live delivery skipped");
        }
    }

    pub async fn stats(&self) -> Result<HubStats> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(HubCommand::Stats { reply })
            .map_err(|_| BaropotError::ServiceUnavailable("notification hub stopped".to_string()))?;

        response
            .await
            .map_err(|_| BaropotError::ServiceUnavailable("notification hub stopped".to_string()))
    }
}

async fn run_hub(mut inbox: mpsc::UnboundedReceiver<HubCommand>, capacity: usize) {
    let mut channels: HashMap<i64, broadcast::Sender<Notification>> = HashMap::new();

    while let Some(command) = inbox.recv().await {
        match command {
            HubCommand::Subscribe { user_id, reply } => {
                let sender = channels
                    .entry(user_id)
                    .or_insert_with(|| broadcast::channel(capacity).0);

                // Caller went away before the reply arrived
                if reply.send(sender.subscribe()).is_err() {
                    release(&mut channels, user_id);
                }
            }
            HubCommand::Publish { notification } => {
                if let Some(sender) = channels.get(&notification.recipient_id) {
                    let recipient_id = notification.recipient_id;
                    if sender.send(notification).is_err() {
                        debug!(recipient_id = recipient_id, "No live receivers for notification");
                    }
                }
            }
            HubCommand::Release { user_id } => release(&mut channels, user_id),
            HubCommand::Stats { reply } => {
                let stats = HubStats {
                    users: channels.len(),
                    subscriptions: channels.values().map(|s| s.receiver_count()).sum(),
                };
                let _ = reply.send(stats);
            }
        }
    }

    debug!("Notification hub stopped");
}

fn release(channels: &mut HashMap<i64, broadcast::Sender<Notification>>, user_id: i64) {
    if channels.get(&user_id).is_some_and(|sender| sender.receiver_count() == 0) {
        channels.remove(&user_id);
        debug!(user_id = user_id, "Released live notification channel");
    }
}

/// Live notification feed of one user; releases its registry slot on drop
pub struct Subscription {
    user_id: i64,
    receiver: Option<broadcast::Receiver<Notification>>,
    commands: mpsc::UnboundedSender<HubCommand>,
}

impl Subscription {
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Next notification; `None` once the hub is gone.
    ///
    /// A subscriber that falls behind skips the missed items.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            let receiver = self.receiver.as_mut()?;
            match receiver.recv().await {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(user_id = self.user_id, skipped = skipped, "Live notification subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Notification> {
        let mut subscription = self;
        async_stream::stream! {
            while let Some(notification) = subscription.recv().await {
                yield notification;
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Receiver goes first so the hub sees the decremented count
        drop(self.receiver.take());
        let _ = self.commands.send(HubCommand::Release { user_id: self.user_id });
    }
}

/// Notification service: persistence plus live fan-out
#[derive(Clone)]
pub struct NotificationService {
    repository: NotificationRepository,
    hub: NotificationHub,
}

impl NotificationService {
    pub fn new(repository: NotificationRepository, hub: NotificationHub) -> Self {
        Self { repository, hub }
    }

    /// Store and push a notification. Failures are logged, never returned.
    pub async fn notify(&self, new: NewNotification) -> Option<Notification> {
        match self.repository.create(&new).await {
            Ok(notification) => {
                debug!(
                    notification_id = notification.id,
                    recipient_id = notification.recipient_id,
                    kind = notification.kind.as_str(),
                    "Notification stored"
                );
                self.hub.publish(notification.clone());
                Some(notification)
            }
            Err(e) => {
                log_notification_failure(new.recipient_id, new.kind.as_str(), &e.to_string());
                None
            }
        }
    }

    /// Send the same message to several recipients; returns how many were stored
    pub async fn notify_many(
        &self,
        kind: NotificationKind,
        message: &str,
        recipients: &[i64],
        sender_id: Option<i64>,
        context_id: Option<i64>,
    ) -> usize {
        let mut delivered = 0;
        for &recipient_id in recipients {
            let new = NewNotification {
                kind,
                message: message.to_string(),
                recipient_id,
                sender_id,
                context_id,
            };
            if self.notify(new).await.is_some() {
                delivered += 1;
            }
        }

        info!(kind = kind.as_str(), recipients = recipients.len(), delivered = delivered, "Notifications fanned out");
        delivered
    }

    pub async fn subscribe(&self, user_id: i64) -> Result<Subscription> {
        self.hub.subscribe(user_id).await
    }

    /// Unread notifications, newest first
    pub async fn unread(&self, user_id: i64) -> Result<Vec<Notification>> {
        self.repository.unread_for(user_id).await
    }

    /// Mark a notification read; only its recipient may do so
    pub async fn mark_as_read(&self, notification_id: i64, user_id: i64) -> Result<()> {
        if !self.repository.mark_read(notification_id, user_id).await? {
            return Err(BaropotError::not_found("Notification", notification_id));
        }
        Ok(())
    }

    pub async fn hub_stats(&self) -> Result<HubStats> {
        self.hub.stats().await
    }
}

/// Notice to a restaurant owner about someone else's activity; owners acting on
/// their own restaurant are not told
pub fn owner_notice(
    kind: NotificationKind,
    message: String,
    owner_id: i64,
    actor_id: i64,
    restaurant_id: i64,
) -> Option<NewNotification> {
    (owner_id != actor_id).then(|| NewNotification {
        kind,
        message,
        recipient_id: owner_id,
        sender_id: Some(actor_id),
        context_id: Some(restaurant_id),
    })
}
