//! report.rs — Máquina de status de notificação por alvo
//!
//! Função de transição pura `(estado, sinal) -> (novo estado, ação)`. Decide
//! quando um alerta ou uma notificação de recuperação deve ser enviada e
//! suprime repetições de um estado já reportado.
//!
//! A recuperação só é notificada depois que o alerta do episódio foi entregue:
//! se o alvo volta antes da entrega terminar, a recuperação aguarda a
//! confirmação (`alert_delivered`); se o alerta nunca for entregue, não há
//! recuperação a reportar.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ReportStatus {
    #[default]
    Initial,
    Error,
    ErrorReported,
    Healthy,
    HealthyReported,
}

/// Tipo de notificação enviada ao canal de mensagens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Notification {
    Alert,
    Recovery,
}

impl Notification {
    pub fn label(self) -> &'static str {
        match self {
            Notification::Alert => "alerta",
            Notification::Recovery => "recuperação",
        }
    }
}

/// Sinais que alimentam a máquina.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Checagem falhou; carrega o contador já atualizado.
    Failed { consecutive_failures: u32 },
    Healthy,
    Delivered(Notification),
    DeliveryFailed(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReportState {
    pub status: ReportStatus,
    /// Notificação em andamento (no máximo uma por alvo).
    pub in_flight: Option<Notification>,
    /// O alerta do episódio atual já foi entregue e ainda não houve
    /// recuperação entregue.
    pub alert_delivered: bool,
}

impl ReportState {
    fn dispatch(&mut self, notification: Notification) -> Option<Notification> {
        self.in_flight = Some(notification);
        Some(notification)
    }
}

/// Calcula o próximo estado e a notificação a disparar, se houver.
pub fn transition(
    state: ReportState,
    signal: Signal,
    threshold: u32,
) -> (ReportState, Option<Notification>) {
    use ReportStatus::*;

    let mut next = state;
    let action = match signal {
        Signal::Failed {
            consecutive_failures,
        } => match state.status {
            ErrorReported => None,
            // O alerta entregue continua valendo: a recuperação ainda não chegou.
            Healthy if state.alert_delivered => {
                next.status = ErrorReported;
                None
            }
            _ => {
                next.status = Error;
                if consecutive_failures >= threshold && state.in_flight.is_none() {
                    next.dispatch(Notification::Alert)
                } else {
                    None
                }
            }
        },

        Signal::Healthy => match state.status {
            Initial | HealthyReported => None,
            Error | ErrorReported | Healthy => {
                next.status = Healthy;
                if state.in_flight.is_some() {
                    None
                } else if state.alert_delivered {
                    next.dispatch(Notification::Recovery)
                } else {
                    if state.status == Healthy {
                        next.status = HealthyReported;
                    }
                    None
                }
            }
        },

        Signal::Delivered(n) | Signal::DeliveryFailed(n) if state.in_flight != Some(n) => None,

        Signal::Delivered(Notification::Alert) => {
            next.in_flight = None;
            next.alert_delivered = true;
            match state.status {
                Error => {
                    next.status = ErrorReported;
                    None
                }
                Healthy => next.dispatch(Notification::Recovery),
                _ => None,
            }
        }

        Signal::Delivered(Notification::Recovery) => {
            next.in_flight = None;
            next.alert_delivered = false;
            match state.status {
                Healthy => next.status = HealthyReported,
                // Voltou a falhar enquanto a recuperação era enviada: novo episódio.
                ErrorReported => next.status = Error,
                _ => {}
            }
            None
        }

        Signal::DeliveryFailed(_) => {
            next.in_flight = None;
            None
        }
    };

    (next, action)
}
