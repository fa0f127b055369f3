#![allow(dead_code)]

use async_trait::async_trait;
use sentinela::error::NotifyError;
use sentinela::notifier::Notifier;
use sentinela::probe::Probe;
use sentinela::scheduler::run_monitor;
use sentinela::types::{Outcome, Target, TargetRuntimeState};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

pub fn target(url: &str, poll_ms: u64) -> Target {
    Target::new(
        url,
        Duration::from_millis(poll_ms),
        Duration::from_millis(500),
        "servidor fora do ar",
    )
}

pub fn fail() -> Outcome {
    Outcome::failed("Response: 503 Service Unavailable")
}

pub fn ok() -> Outcome {
    Outcome::healthy("200 OK")
}

/// Probe com resultados roteirizados por URL. Quando o roteiro de um alvo
/// acaba, avisa pelo canal `exhausted` e fica pendente para sempre.
pub struct ScriptedProbe {
    scripts: Mutex<HashMap<String, VecDeque<Outcome>>>,
    calls: Mutex<Vec<(String, Instant)>>,
    exhausted: mpsc::UnboundedSender<String>,
}

impl ScriptedProbe {
    pub fn new(
        scripts: HashMap<String, VecDeque<Outcome>>,
        exhausted: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            scripts: Mutex::new(scripts),
            calls: Mutex::new(Vec::new()),
            exhausted,
        }
    }

    /// Instantes em que o alvo foi checado (inclui a checagem pendente final).
    pub fn calls_for(&self, url: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, at)| *at)
            .collect()
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn probe(&self, target: &Target) -> Outcome {
        self.calls
            .lock()
            .unwrap()
            .push((target.id.clone(), Instant::now()));
        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&target.id)
            .and_then(|script| script.pop_front());
        match next {
            Some(outcome) => outcome,
            None => {
                let _ = self.exhausted.send(target.id.clone());
                std::future::pending().await
            }
        }
    }
}

/// Notifier que registra os textos entregues. As primeiras `fail_first`
/// chamadas falham; cada envio leva `delay` no relógio do tokio.
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<String>>,
    attempts: AtomicUsize,
    fail_first: usize,
    delay: Duration,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(fail_first: usize) -> Self {
        Self {
            fail_first,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delivered(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if attempt < self.fail_first {
            return Err(NotifyError::Rejected { status: 502 });
        }
        self.delivered.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub struct ScenarioResult {
    pub states: BTreeMap<String, TargetRuntimeState>,
    pub probe: Arc<ScriptedProbe>,
}

/// Roda o monitor até todos os roteiros acabarem, deixa as entregas
/// pendentes concluírem e então encerra.
pub async fn run_scenario(
    targets: Vec<(Target, Vec<Outcome>)>,
    notifier: Arc<RecordingNotifier>,
) -> ScenarioResult {
    let (exhausted_tx, mut exhausted_rx) = mpsc::unbounded_channel();
    let scripts: HashMap<String, VecDeque<Outcome>> = targets
        .iter()
        .map(|(t, script)| (t.id.clone(), script.iter().cloned().collect()))
        .collect();
    let probe = Arc::new(ScriptedProbe::new(scripts, exhausted_tx));
    let count = targets.len();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = tokio::spawn(run_monitor(
        targets.into_iter().map(|(t, _)| t).collect(),
        probe.clone(),
        notifier,
        shutdown_rx,
    ));

    for _ in 0..count {
        exhausted_rx.recv().await.expect("probe descartada");
    }
    // Com o relógio pausado, o sleep só avança quando nada mais está pronto.
    tokio::time::sleep(Duration::from_secs(3600)).await;

    shutdown_tx.send(true).expect("monitor ativo");
    let states = monitor.await.expect("monitor terminou");
    ScenarioResult { states, probe }
}
