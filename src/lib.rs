//! Monitor de saúde por alvo: checa endpoints HTTP periodicamente e avisa
//! uma única vez quando um alvo cai e uma única vez quando ele volta.

pub mod config;
pub mod error;
pub mod failures;
pub mod logging;
pub mod notifier;
pub mod probe;
pub mod report;
pub mod scheduler;
pub mod types;
