//! Order lifecycle state machine
//!
//! A service order moves strictly forward:
//!
//! ```text
//! EM_ABERTO ──assign──▶ EM_MANUTENCAO ──finalize──▶ CONCLUIDO
//! ```
//!
//! No skips, no way out of `CONCLUIDO`. Every transition carries exactly one
//! audit annotation, whose text is produced here so the wording is identical
//! wherever the transition is applied.

use shared::models::{OrderCreate, OrderStatus};

/// A guarded state change: legal only when the order is currently `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// Claiming the order for maintenance.
pub const ASSIGN: Transition = Transition {
    from: OrderStatus::EmAberto,
    to: OrderStatus::EmManutencao,
};

/// Closing the order with the outbound receipt.
pub const FINALIZE: Transition = Transition {
    from: OrderStatus::EmManutencao,
    to: OrderStatus::Concluido,
};

impl Transition {
    /// Whether this transition is legal from `current`.
    pub fn permitted_from(&self, current: OrderStatus) -> bool {
        current == self.from
    }
}

/// Intake annotation, appended when an order is created.
pub fn intake_annotation(data: &OrderCreate) -> String {
    format!(
        "Entrada: {}. NF: {}. OM: {}.",
        data.descricao, data.nota_entrada, data.om
    )
}

/// Annotation recorded when a technician claims the order.
pub fn assign_annotation(tecnico: &str) -> String {
    format!("Serviço assumido pelo técnico: {tecnico}.")
}

/// Annotation recorded when the order is concluded and invoiced.
pub fn finalize_annotation(nota_saida: &str) -> String {
    format!("Serviço CONCLUÍDO. NF de Saída/Faturamento: {nota_saida}.")
}
