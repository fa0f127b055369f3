use crate::failures;
use crate::report::{self, Notification, ReportState, ReportStatus, Signal};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Quantidade de falhas consecutivas necessária para disparar um alerta.
pub const ALERT_THRESHOLD: u32 = 3;

/// Alvo monitorado (imutável, carregado uma única vez).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// URL do alvo, usada também como chave.
    pub id: String,
    pub poll_interval: Duration,
    pub check_timeout: Duration,
    pub alert_threshold: u32,
    /// Mensagem enviada junto com o alerta.
    pub message: String,
}

impl Target {
    pub fn new(
        url: impl Into<String>,
        poll_interval: Duration,
        check_timeout: Duration,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: url.into(),
            poll_interval,
            check_timeout,
            alert_threshold: ALERT_THRESHOLD,
            message: message.into(),
        }
    }

    /// Texto enviado quando o alvo atinge o limite de falhas.
    pub fn alert_text(&self) -> String {
        format!("URL: {}, {}", self.id, self.message)
    }

    /// Texto enviado quando o alvo volta a responder.
    pub fn recovery_text(&self) -> String {
        format!("URL: {} is now healthy", self.id)
    }

    pub fn text_for(&self, notification: Notification) -> String {
        match notification {
            Notification::Alert => self.alert_text(),
            Notification::Recovery => self.recovery_text(),
        }
    }
}

/// Resultado binário de uma checagem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub healthy: bool,
    pub detail: String,
}

impl Outcome {
    pub fn healthy(detail: impl Into<String>) -> Self {
        Self {
            healthy: true,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            healthy: false,
            detail: detail.into(),
        }
    }

    pub fn timed_out() -> Self {
        Self::failed("timed out")
    }
}

/// Estado mutável de um alvo, pertencente exclusivamente à task que o monitora.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetRuntimeState {
    pub consecutive_failures: u32,
    pub report: ReportState,
    /// Início da sequência de falhas atual (apenas para logs).
    pub failing_since: Option<DateTime<Utc>>,
}

impl TargetRuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ReportStatus {
        self.report.status
    }

    /// Aplica o resultado de uma checagem: primeiro o contador, depois a
    /// máquina de status (que precisa enxergar o contador já atualizado).
    pub fn observe(
        &mut self,
        outcome: &Outcome,
        threshold: u32,
        now: DateTime<Utc>,
    ) -> Option<Notification> {
        self.consecutive_failures = failures::on_outcome(self.consecutive_failures, outcome);

        let signal = if outcome.healthy {
            Signal::Healthy
        } else {
            if self.failing_since.is_none() {
                self.failing_since = Some(now);
            }
            Signal::Failed {
                consecutive_failures: self.consecutive_failures,
            }
        };
        self.apply(signal, threshold)
    }

    /// Aplica o resultado de uma entrega de notificação.
    pub fn on_delivery(
        &mut self,
        notification: Notification,
        delivered: bool,
        threshold: u32,
    ) -> Option<Notification> {
        let signal = if delivered {
            Signal::Delivered(notification)
        } else {
            Signal::DeliveryFailed(notification)
        };
        self.apply(signal, threshold)
    }

    /// Fecha a sequência de falhas, devolvendo há quanto tempo o alvo falhava.
    pub fn close_failure_streak(&mut self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.failing_since.take().map(|since| now - since)
    }

    fn apply(&mut self, signal: Signal, threshold: u32) -> Option<Notification> {
        let (next, action) = report::transition(self.report, signal, threshold);
        self.report = next;
        action
    }
}
