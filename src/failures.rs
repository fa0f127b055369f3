use crate::types::Outcome;

/// Atualiza o contador de falhas consecutivas de um alvo.
/// Falha incrementa; qualquer resposta saudável zera.
pub fn on_outcome(consecutive_failures: u32, outcome: &Outcome) -> u32 {
    if outcome.healthy {
        0
    } else {
        consecutive_failures.saturating_add(1)
    }
}
