// src/scheduler.rs

use crate::notifier::Notifier;
use crate::probe::Probe;
use crate::report::Notification;
use crate::types::{Outcome, Target, TargetRuntimeState};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

/// Resultado de uma entrega: qual notificação e se foi aceita pelo canal.
type Delivery = (Notification, bool);

/// Loop de monitoramento de um único alvo.
///
/// Dono exclusivo do `TargetRuntimeState` do alvo; nenhum outro loop o acessa.
pub struct TargetWorker {
    target: Target,
    probe: Arc<dyn Probe>,
    notifier: Arc<dyn Notifier>,
    state: TargetRuntimeState,
    /// Notificações em andamento. Abortadas quando o worker termina.
    deliveries: JoinSet<Delivery>,
    shutdown: watch::Receiver<bool>,
}

impl TargetWorker {
    pub fn new(
        target: Target,
        probe: Arc<dyn Probe>,
        notifier: Arc<dyn Notifier>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            target,
            probe,
            notifier,
            state: TargetRuntimeState::new(),
            deliveries: JoinSet::new(),
            shutdown,
        }
    }

    /// Roda até o shutdown e devolve o estado final do alvo.
    pub async fn run(mut self) -> TargetRuntimeState {
        info!(
            "[ALVO {}] Monitoramento iniciado (intervalo {:?}, timeout {:?}).",
            self.target.id, self.target.poll_interval, self.target.check_timeout
        );

        let mut ticker = interval(self.target.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !*self.shutdown.borrow() {
            tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                Some(joined) = self.deliveries.join_next() => self.on_delivery(joined),
                _ = ticker.tick() => {
                    if self.probe_burst().await.is_none() {
                        break;
                    }
                }
            }
        }

        info!(
            "[ALVO {}] Monitoramento encerrado ({} notificações abandonadas).",
            self.target.id,
            self.deliveries.len()
        );
        self.state
    }

    /// Checa o alvo e, enquanto falhar abaixo do limite, checa de novo sem
    /// esperar o próximo ciclo. No máximo `alert_threshold` checagens.
    ///
    /// Retorna `None` se o shutdown chegar durante uma checagem.
    async fn probe_burst(&mut self) -> Option<()> {
        let threshold = self.target.alert_threshold;

        for attempt in 1..=threshold.max(1) {
            let outcome = self.probe_once().await?;
            let now = Utc::now();

            if outcome.healthy {
                if let Some(down_for) = self.state.close_failure_streak(now) {
                    info!(
                        "[ALVO {}] Respondendo novamente após {}s com falhas.",
                        self.target.id,
                        down_for.num_seconds()
                    );
                }
            }

            let action = self.state.observe(&outcome, threshold, now);
            self.log_outcome(&outcome, attempt);
            if let Some(notification) = action {
                self.dispatch(notification);
            }

            if outcome.healthy || self.state.consecutive_failures >= threshold {
                break;
            }
        }
        Some(())
    }

    /// Aguarda uma checagem, processando entregas concluídas enquanto isso.
    async fn probe_once(&mut self) -> Option<Outcome> {
        let probe = Arc::clone(&self.probe);
        let target = self.target.clone();
        let probing = probe.probe(&target);
        tokio::pin!(probing);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.changed() => return None,
                Some(joined) = self.deliveries.join_next() => self.on_delivery(joined),
                outcome = &mut probing => return Some(outcome),
            }
        }
    }

    fn log_outcome(&self, outcome: &Outcome, attempt: u32) {
        if outcome.healthy {
            debug!(
                "[ALVO {}] OK: {} (status={:?})",
                self.target.id,
                outcome.detail,
                self.state.status()
            );
        } else {
            warn!(
                "[ALVO {}][TENTATIVA {}] Falha: {} ({} consecutivas, status={:?})",
                self.target.id,
                attempt,
                outcome.detail,
                self.state.consecutive_failures,
                self.state.status()
            );
        }
    }

    /// Dispara a notificação sem bloquear o loop; o resultado volta por `deliveries`.
    fn dispatch(&mut self, notification: Notification) {
        let text = self.target.text_for(notification);
        let notifier = Arc::clone(&self.notifier);
        let url = self.target.id.clone();

        info!("[ALVO {}] Enviando {}: {}", url, notification.label(), text);
        self.deliveries.spawn(async move {
            match notifier.send(&text).await {
                Ok(()) => (notification, true),
                Err(e) => {
                    error!(
                        "[ALVO {}] Falha ao enviar {}: {}",
                        url,
                        notification.label(),
                        e
                    );
                    (notification, false)
                }
            }
        });
    }

    fn on_delivery(&mut self, joined: Result<Delivery, JoinError>) {
        let (notification, delivered) = match joined {
            Ok(delivery) => delivery,
            Err(e) => {
                error!(
                    "[ALVO {}] Task de notificação terminou com erro: {:?}",
                    self.target.id, e
                );
                // Só existe uma notificação em andamento por alvo.
                match self.state.report.in_flight {
                    Some(notification) => (notification, false),
                    None => return,
                }
            }
        };

        if delivered {
            info!(
                "[ALVO {}] {} entregue.",
                self.target.id,
                notification.label()
            );
        }

        let threshold = self.target.alert_threshold;
        if let Some(next) = self.state.on_delivery(notification, delivered, threshold) {
            self.dispatch(next);
        }
    }
}

/// Spawna um worker por alvo e aguarda todos terminarem (após o shutdown).
///
/// Devolve o estado final de cada alvo, indexado pela URL.
pub async fn run_monitor(
    targets: Vec<Target>,
    probe: Arc<dyn Probe>,
    notifier: Arc<dyn Notifier>,
    shutdown: watch::Receiver<bool>,
) -> BTreeMap<String, TargetRuntimeState> {
    let mut handles = Vec::with_capacity(targets.len());
    for target in targets {
        let id = target.id.clone();
        let worker = TargetWorker::new(
            target,
            Arc::clone(&probe),
            Arc::clone(&notifier),
            shutdown.clone(),
        );
        handles.push((id, tokio::spawn(worker.run())));
    }

    let mut states = BTreeMap::new();
    for (id, handle) in handles {
        match handle.await {
            Ok(state) => {
                states.insert(id, state);
            }
            Err(e) => error!("[ALVO {}] Erro no scheduler: {:?}", id, e),
        }
    }
    states
}
