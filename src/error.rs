use thiserror::Error;

/// Erros de carregamento e validação da configuração. Sempre fatais na inicialização.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("falha ao carregar configuração: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("nenhum alvo configurado")]
    NoTargets,

    #[error("alvo {url}: {field} deve ser maior que zero")]
    ZeroDuration { url: String, field: &'static str },

    #[error("URL inválida '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("alvo duplicado: {0}")]
    DuplicateTarget(String),

    #[error("bot_token do notificador não pode ser vazio")]
    MissingToken,
}

/// Falha na entrega de uma notificação. Recuperável: a máquina de status
/// reavalia no próximo sinal.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("erro de transporte: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("notificação rejeitada com status {status}")]
    Rejected { status: u16 },
}
