use anyhow::Result;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::models::Message;

/// Notification channel the `messages` insert trigger publishes on.
pub const MESSAGES_CHANNEL: &str = "messages_inserted";

/// Which inserted messages a subscription forwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MessageFilter {
    project_id: i32,
}

impl MessageFilter {
    pub fn project(project_id: i32) -> Self {
        Self { project_id }
    }

    pub fn project_id(&self) -> i32 {
        self.project_id
    }

    /// Decode a notification payload, keeping it only if it belongs to the
    /// filtered project.
    pub fn accept(&self, payload: &str) -> Result<Option<Message>> {
        let message: Message = serde_json::from_str(payload)?;
        if message.project_id == self.project_id {
            Ok(Some(message))
        } else {
            Ok(None)
        }
    }
}

/// Live feed of inserted messages for one project.
///
/// Rows arrive in notification order. Dropping the subscription stops the
/// listener task and releases its connection.
pub struct MessageSubscription {
    filter: MessageFilter,
    receiver: UnboundedReceiver<Message>,
    task: JoinHandle<()>,
}

impl MessageSubscription {
    pub async fn open(pool: &PgPool, filter: MessageFilter) -> Result<Self> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(MESSAGES_CHANNEL).await?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(forward(listener, filter, sender));
        debug!(project_id = filter.project_id(), "message subscription opened");

        Ok(Self { filter, receiver, task })
    }

    pub fn project_id(&self) -> i32 {
        self.filter.project_id()
    }

    /// Everything received since the last call, without waiting.
    pub fn drain(&mut self) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            messages.push(message);
        }
        messages
    }
}

impl Drop for MessageSubscription {
    fn drop(&mut self) {
        self.task.abort();
        debug!(project_id = self.filter.project_id(), "message subscription closed");
    }
}

async fn forward(mut listener: PgListener, filter: MessageFilter, sender: UnboundedSender<Message>) {
    loop {
        let notification = match listener.recv().await {
            Ok(notification) => notification,
            Err(err) => {
                error!(error = %err, "message listener stopped");
                return;
            }
        };

        match filter.accept(notification.payload()) {
            Ok(Some(message)) => {
                if sender.send(message).is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "undecodable message notification"),
        }
    }
}
