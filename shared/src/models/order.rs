//! Ordem de Serviço Model
//!
//! A service order follows a strict linear lifecycle:
//! `EM_ABERTO → EM_MANUTENCAO → CONCLUIDO`. Every state change appends an
//! immutable [`Annotation`] to the order's audit trail.

use serde::{Deserialize, Serialize};

/// Author recorded on system-generated annotations.
pub const SYSTEM_TECNICO: &str = "Sistema";

/// Service order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum OrderStatus {
    /// Received, waiting for a technician to claim it
    #[serde(rename = "EM_ABERTO")]
    #[cfg_attr(feature = "db", sqlx(rename = "EM_ABERTO"))]
    EmAberto,
    /// Claimed by a technician, under maintenance
    #[serde(rename = "EM_MANUTENCAO")]
    #[cfg_attr(feature = "db", sqlx(rename = "EM_MANUTENCAO"))]
    EmManutencao,
    /// Serviced and invoiced; terminal state
    #[serde(rename = "CONCLUIDO")]
    #[cfg_attr(feature = "db", sqlx(rename = "CONCLUIDO"))]
    Concluido,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::EmAberto => "EM_ABERTO",
            OrderStatus::EmManutencao => "EM_MANUTENCAO",
            OrderStatus::Concluido => "CONCLUIDO",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::EmAberto
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service order record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// Item received for repair
    pub item: String,
    /// Client the item belongs to
    pub cliente: String,
    /// Inbound receipt reference (NF de entrada)
    pub nota_entrada: String,
    /// Outbound receipt reference, empty until completion
    pub nota_saida: String,
    /// Free-text problem description
    pub descricao: String,
    /// Work-order reference (ordem de manutenção)
    pub om: String,
    /// Units received (>= 1)
    pub quantidade: i64,
    pub status: OrderStatus,
    /// Intake timestamp (UTC millis), set once at creation
    pub data_entrada: i64,
    /// Assigned technician, null until the order is claimed
    pub tecnico: Option<String>,
    /// Audit trail, ordered by creation time then id
    #[serde(default)]
    #[cfg_attr(feature = "db", sqlx(skip))]
    pub anotacoes: Vec<Annotation>,
}

/// Immutable audit note attached to an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: i64,
    pub texto: String,
    /// Authoring technician; `"Sistema"` for system-generated notes
    pub tecnico: Option<String>,
    /// Creation timestamp (UTC millis), set once
    pub data: i64,
    pub order_id: i64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub item: String,
    pub cliente: String,
    pub nota_entrada: String,
    pub om: String,
    #[serde(default = "default_quantidade")]
    pub quantidade: i64,
    pub descricao: String,
    pub tecnico: Option<String>,
}

fn default_quantidade() -> i64 {
    1
}

/// Assign payload (claim the order)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAssign {
    pub tecnico: String,
}

/// Finalize payload (close the order with the outbound receipt)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFinalize {
    pub nota_saida: String,
    pub tecnico: Option<String>,
}

/// Free-form annotation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationCreate {
    pub texto: String,
    pub tecnico: Option<String>,
}
