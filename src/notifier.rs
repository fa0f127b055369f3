//! notifier.rs — Envio de mensagens para o canal de alertas (Bot API do Telegram)

use crate::config::NotifierConfig;
use crate::error::NotifyError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

/// Envia um texto ao canal de notificação.
///
/// Não faz retentativas: quem decide reenviar é a máquina de status.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: i64,
}

impl TelegramNotifier {
    pub fn new(client: Client, config: &NotifierConfig) -> Self {
        let endpoint = format!(
            "{}/bot{}/sendMessage",
            config.api_base_url.trim_end_matches('/'),
            config.bot_token
        );
        Self {
            client,
            endpoint,
            chat_id: config.chat_id,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "chat_id": self.chat_id, "text": text }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
