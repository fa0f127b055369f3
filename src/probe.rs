//! probe.rs — Checagem HTTP de um alvo com timeout
//!
//! A requisição corre contra o timer de `check_timeout`; quem perde a corrida
//! é descartado (a future da requisição é dropada e a conexão abandonada).

use crate::types::{Outcome, Target};
use async_trait::async_trait;
use reqwest::Client;
use tokio::time::timeout;
use tracing::debug;

/// Executa uma checagem de saúde contra um alvo.
///
/// Nunca retorna erro: timeout, status não-2xx e falha de transporte viram
/// `Outcome` com `healthy = false`.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &Target) -> Outcome;
}

/// Probe via HTTP GET, compartilhando um único `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, target: &Target) -> Outcome {
        let request = self.client.get(&target.id).send();

        let outcome = match timeout(target.check_timeout, request).await {
            Ok(Ok(response)) if response.status().is_success() => {
                Outcome::healthy(response.status().to_string())
            }
            Ok(Ok(response)) => Outcome::failed(format!("Response: {}", response.status())),
            Ok(Err(e)) => Outcome::failed(e.to_string()),
            Err(_) => Outcome::timed_out(),
        };

        debug!(
            "[ALVO {}] Checagem concluída: healthy={} ({})",
            target.id, outcome.healthy, outcome.detail
        );
        outcome
    }
}
