//! In-process message store for offline runs and tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{reject_blank, ChatMessage, MessageStore, StoreError};

/// Message store backed by a vector.
pub struct MemoryStore {
    messages: RwLock<Vec<ChatMessage>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Make every call fail with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// All stored messages in insertion order.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    fn id(&self) -> &str {
        "memory"
    }

    async fn send(&self, sender: &str, recipient: &str, text: &str) -> Result<ChatMessage, StoreError> {
        self.check_online()?;
        reject_blank(text)?;

        let mut message = ChatMessage::new(sender, recipient, text);
        message.timestamp = Some(Utc::now());
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn history(&self, account: &str, peer: &str) -> Result<Vec<ChatMessage>, StoreError> {
        self.check_online()?;
        let mut history: Vec<_> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.is_between(account, peer))
            .cloned()
            .collect();
        history.sort_by_key(|m| m.timestamp);
        Ok(history)
    }

    async fn first_inbound(&self, recipient: &str) -> Result<Option<ChatMessage>, StoreError> {
        self.check_online()?;
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.recipient == recipient && m.sender != recipient)
            .min_by_key(|m| m.timestamp)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_both_directions() {
        let store = MemoryStore::new();
        store.send("client", "freelancer", "hi").await.unwrap();
        store.send("freelancer", "client", "hello!").await.unwrap();
        store.send("other", "freelancer", "ping").await.unwrap();

        let history = store.history("client", "freelancer").await.unwrap();
        let texts: Vec<_> = history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["hi", "hello!"]);
    }

    #[tokio::test]
    async fn test_first_inbound() {
        let store = MemoryStore::new();
        assert!(store.first_inbound("freelancer").await.unwrap().is_none());

        store.send("freelancer", "freelancer", "note to self").await.unwrap();
        store.send("client-a", "freelancer", "first").await.unwrap();
        store.send("client-b", "freelancer", "second").await.unwrap();

        let first = store.first_inbound("freelancer").await.unwrap().unwrap();
        assert_eq!(first.sender, "client-a");
    }

    #[tokio::test]
    async fn test_blank_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.send("a", "b", "   ").await,
            Err(StoreError::Rejected(_))
        ));
        assert!(store.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_offline() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = tokio_test::assert_err!(store.send("a", "b", "hi").await);
        assert!(matches!(err, StoreError::Unavailable));
        store.set_offline(false);
        tokio_test::assert_ok!(store.send("a", "b", "hi").await);
    }
}
