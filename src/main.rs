use anyhow::{Context, Result};
use sentinela::config::Config;
use sentinela::notifier::{Notifier, TelegramNotifier};
use sentinela::probe::{HttpProbe, Probe};
use sentinela::{logging, scheduler};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    // Configuração é carregada uma única vez; erros aqui são fatais.
    let config = Config::load().context("falha ao carregar configuração")?;
    config.validate().context("configuração inválida")?;
    info!("Configuração carregada: {} alvos", config.targets.len());

    let client = reqwest::Client::builder()
        .build()
        .context("falha ao criar cliente HTTP")?;
    let probe: Arc<dyn Probe> = Arc::new(HttpProbe::new(client.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(client, &config.notifier));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = tokio::spawn(scheduler::run_monitor(
        config.targets(),
        probe,
        notifier,
        shutdown_rx,
    ));

    tokio::signal::ctrl_c()
        .await
        .context("falha ao aguardar sinal de encerramento")?;
    info!("Sinal recebido, encerrando monitoramento...");
    let _ = shutdown_tx.send(true);

    let states = monitor.await.context("scheduler terminou com erro")?;
    for (url, state) in &states {
        info!(
            "[ALVO {}] Estado final: {:?}, {} falhas consecutivas",
            url,
            state.status(),
            state.consecutive_failures
        );
    }
    debug!("Resumo: {}", serde_json::to_string(&states)?);

    Ok(())
}
