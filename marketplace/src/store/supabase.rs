//! Hosted message store over the Supabase REST interface.
//!
//! Rows live in a single table with `from`, `to`, `text` and a
//! server-assigned `timestamp`.

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Serialize;
use tracing::debug;

use super::{reject_blank, ChatMessage, MessageStore, StoreError};

/// Default table holding chat messages.
pub const DEFAULT_TABLE: &str = "messages";

/// Message store backed by a Supabase project.
pub struct SupabaseStore {
    client: Client,
    table_url: String,
    id: String,
}

#[derive(Debug, Serialize)]
struct NewMessage<'a> {
    from: &'a str,
    to: &'a str,
    text: &'a str,
}

impl SupabaseStore {
    /// Create a store for the project at `url`, authenticated with the
    /// project's anonymous key.
    pub fn new(url: &str, anon_key: &str, table: &str) -> Result<Self, StoreError> {
        let url = url.trim_end_matches('/');
        if url.is_empty() {
            return Err(StoreError::NotConfigured("missing project URL".to_string()));
        }
        if anon_key.trim().is_empty() {
            return Err(StoreError::NotConfigured("missing anon key".to_string()));
        }

        let invalid_key = |_| StoreError::NotConfigured("anon key is not a valid header".to_string());
        let mut headers = header::HeaderMap::new();
        headers.insert("apikey", header::HeaderValue::from_str(anon_key).map_err(invalid_key)?);
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", anon_key)).map_err(invalid_key)?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::NotConfigured(e.to_string()))?;

        Ok(Self {
            client,
            table_url: format!("{}/rest/v1/{}", url, table),
            id: format!("supabase:{}", url),
        })
    }

    async fn rows(response: Response) -> Result<Vec<ChatMessage>, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MessageStore for SupabaseStore {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send(&self, sender: &str, recipient: &str, text: &str) -> Result<ChatMessage, StoreError> {
        reject_blank(text)?;

        let body = [NewMessage {
            from: sender,
            to: recipient,
            text,
        }];
        let response = self
            .client
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let stored = Self::rows(response)
            .await?
            .into_iter()
            .next()
            .unwrap_or_else(|| ChatMessage::new(sender, recipient, text));

        debug!(store = %self.id, %sender, %recipient, "Message stored");
        Ok(stored)
    }

    async fn history(&self, account: &str, peer: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let filter = format!(
            "(and(from.eq.{account},to.eq.{peer}),and(from.eq.{peer},to.eq.{account}))"
        );
        let response = self
            .client
            .get(&self.table_url)
            .query(&[
                ("select", "*"),
                ("or", filter.as_str()),
                ("order", "timestamp.asc"),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Self::rows(response).await
    }

    async fn first_inbound(&self, recipient: &str) -> Result<Option<ChatMessage>, StoreError> {
        let to = format!("eq.{recipient}");
        let from = format!("neq.{recipient}");
        let response = self
            .client
            .get(&self.table_url)
            .query(&[
                ("select", "*"),
                ("to", to.as_str()),
                ("from", from.as_str()),
                ("order", "timestamp.asc"),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self::rows(response).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_credentials() {
        assert!(matches!(
            SupabaseStore::new("", "key", DEFAULT_TABLE),
            Err(StoreError::NotConfigured(_))
        ));
        assert!(matches!(
            SupabaseStore::new("https://project.supabase.co", " ", DEFAULT_TABLE),
            Err(StoreError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_table_url() {
        let store = SupabaseStore::new("https://project.supabase.co/", "anon", "chat").unwrap();
        assert_eq!(store.table_url, "https://project.supabase.co/rest/v1/chat");
        assert_eq!(store.id(), "supabase:https://project.supabase.co");
    }
}
