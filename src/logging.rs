use tracing_subscriber::EnvFilter;

/// Inicializa o sistema de logging (tracing). `RUST_LOG` controla o nível;
/// sem ele, usa `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Se já houver um subscriber global (ex.: em testes), mantém o existente.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
