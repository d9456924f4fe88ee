//! OrderService — the only mutation path for service orders
//!
//! Wraps each lifecycle transition and each repository write in one SQLite
//! transaction so "mutate order" and "append annotation" commit together or
//! not at all. Concurrent handlers race safely: the compare-and-set in
//! [`repository::order::transition`] lets exactly one claim win.

use shared::models::{
    AnnotationCreate, Order, OrderAssign, OrderCreate, OrderFinalize, SYSTEM_TECNICO,
};
use sqlx::SqlitePool;

use crate::db::repository::{order, RepoError};
use crate::orders::lifecycle::{self, Transition, ASSIGN, FINALIZE};
use crate::utils::validation::{
    validate_optional_text, validate_required_text, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_TEXT_LEN,
};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new order in `EM_ABERTO` with its intake annotation.
    pub async fn create(&self, data: OrderCreate) -> AppResult<Order> {
        validate_required_text(&data.item, "item", MAX_NAME_LEN)?;
        validate_required_text(&data.cliente, "cliente", MAX_NAME_LEN)?;
        validate_required_text(&data.nota_entrada, "notaEntrada", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&data.om, "om", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&data.descricao, "descricao", MAX_TEXT_LEN)?;
        validate_optional_text(&data.tecnico, "tecnico", MAX_NAME_LEN)?;
        if data.quantidade < 1 {
            return Err(AppError::validation(format!(
                "quantidade must be >= 1, got {}",
                data.quantidade
            )));
        }

        let now = shared::util::now_millis();
        let mut tx = self.begin().await?;

        let id = order::insert_order(&mut tx, &data, now).await?;
        let texto = lifecycle::intake_annotation(&data);
        let autor = data.tecnico.as_deref().unwrap_or(SYSTEM_TECNICO);
        order::insert_annotation(&mut tx, id, &texto, Some(autor), now).await?;

        self.commit(tx).await?;

        tracing::info!(order_id = id, cliente = %data.cliente, "Ordem de serviço created");
        order::find_detail(&self.pool, id).await.map_err(Into::into)
    }

    /// All orders with their audit trails, ordered by id.
    pub async fn list(&self) -> AppResult<Vec<Order>> {
        order::find_all(&self.pool).await.map_err(Into::into)
    }

    /// One order with its audit trail.
    pub async fn get(&self, id: i64) -> AppResult<Order> {
        order::find_detail(&self.pool, id).await.map_err(Into::into)
    }

    /// Audit trail of one order, in creation order.
    pub async fn annotations(&self, id: i64) -> AppResult<Vec<shared::models::Annotation>> {
        order::find_annotations(&self.pool, id).await.map_err(Into::into)
    }

    /// Delete an order and, atomically, its whole audit trail.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        order::delete(&self.pool, id).await?;
        tracing::info!(order_id = id, "Ordem de serviço deleted");
        Ok(())
    }

    /// Claim an open order for a technician (`EM_ABERTO → EM_MANUTENCAO`).
    pub async fn assign(&self, id: i64, data: OrderAssign) -> AppResult<Order> {
        validate_required_text(&data.tecnico, "tecnico", MAX_NAME_LEN)?;

        let texto = lifecycle::assign_annotation(&data.tecnico);
        self.apply_transition(id, ASSIGN, Some(&data.tecnico), None, &texto, &data.tecnico)
            .await
    }

    /// Conclude an order in maintenance (`EM_MANUTENCAO → CONCLUIDO`).
    ///
    /// `nota_saida` is required here and written in the same statement as the
    /// status change, keeping the "non-empty iff concluded" invariant.
    pub async fn finalize(&self, id: i64, data: OrderFinalize) -> AppResult<Order> {
        validate_required_text(&data.nota_saida, "notaSaida", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.tecnico, "tecnico", MAX_NAME_LEN)?;

        let texto = lifecycle::finalize_annotation(&data.nota_saida);
        let autor = data.tecnico.as_deref().unwrap_or(SYSTEM_TECNICO).to_string();
        self.apply_transition(
            id,
            FINALIZE,
            data.tecnico.as_deref(),
            Some(&data.nota_saida),
            &texto,
            &autor,
        )
        .await
    }

    /// Append a free-form annotation without touching the status.
    pub async fn annotate(&self, id: i64, data: AnnotationCreate) -> AppResult<Order> {
        validate_required_text(&data.texto, "texto", MAX_TEXT_LEN)?;
        validate_optional_text(&data.tecnico, "tecnico", MAX_NAME_LEN)?;

        let now = shared::util::now_millis();
        let mut tx = self.begin().await?;

        // Existence check inside the transaction keeps the FK error path out
        // of the API surface
        if order::get_status_tx(&mut tx, id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Ordem de serviço {id} não encontrada"
            )));
        }
        let autor = data.tecnico.as_deref().unwrap_or(SYSTEM_TECNICO);
        order::insert_annotation(&mut tx, id, &data.texto, Some(autor), now).await?;

        self.commit(tx).await?;
        order::find_detail(&self.pool, id).await.map_err(Into::into)
    }

    /// Apply a guarded transition and its mandatory annotation in one
    /// transaction. On a failed guard nothing is written; the stored state is
    /// read inside the same transaction to report `NotFound` vs
    /// `InvalidTransition`.
    async fn apply_transition(
        &self,
        id: i64,
        t: Transition,
        tecnico: Option<&str>,
        nota_saida: Option<&str>,
        texto: &str,
        autor: &str,
    ) -> AppResult<Order> {
        let now = shared::util::now_millis();
        let mut tx = self.begin().await?;

        let updated = order::transition(&mut tx, id, t.from, t.to, tecnico, nota_saida).await?;
        if !updated {
            let current = order::get_status_tx(&mut tx, id).await?;
            // Dropping tx rolls back; nothing was applied anyway
            return match current {
                None => Err(AppError::not_found(format!(
                    "Ordem de serviço {id} não encontrada"
                ))),
                Some(current) => Err(RepoError::InvalidTransition {
                    order_id: id,
                    current,
                }
                .into()),
            };
        }

        order::insert_annotation(&mut tx, id, texto, Some(autor), now).await?;
        self.commit(tx).await?;

        tracing::info!(order_id = id, from = %t.from, to = %t.to, "Lifecycle transition applied");
        order::find_detail(&self.pool, id).await.map_err(Into::into)
    }

    async fn begin(&self) -> AppResult<sqlx::Transaction<'static, sqlx::Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))
    }

    async fn commit(&self, tx: sqlx::Transaction<'static, sqlx::Sqlite>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderStatus;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_service() -> OrderService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE service_order (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item TEXT NOT NULL,
                cliente TEXT NOT NULL,
                nota_entrada TEXT NOT NULL,
                nota_saida TEXT NOT NULL DEFAULT '',
                descricao TEXT NOT NULL,
                om TEXT NOT NULL,
                quantidade INTEGER NOT NULL DEFAULT 1,
                status TEXT NOT NULL DEFAULT 'EM_ABERTO',
                data_entrada INTEGER NOT NULL,
                tecnico TEXT
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE TABLE annotation (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                texto TEXT NOT NULL,
                tecnico TEXT,
                data INTEGER NOT NULL,
                order_id INTEGER NOT NULL REFERENCES service_order(id) ON DELETE CASCADE
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        OrderService::new(pool)
    }

    fn cafe_order() -> OrderCreate {
        OrderCreate {
            item: "Máquina de Café".to_string(),
            cliente: "Cafeteria Alfa".to_string(),
            nota_entrada: "NF-9876".to_string(),
            om: "OM-001".to_string(),
            quantidade: 1,
            descricao: "Vazamento".to_string(),
            tecnico: None,
        }
    }

    #[tokio::test]
    async fn create_opens_with_intake_annotation() {
        let svc = test_service().await;
        let order = svc.create(cafe_order()).await.unwrap();

        assert_eq!(order.status, OrderStatus::EmAberto);
        assert_eq!(order.anotacoes.len(), 1);
        let nota = &order.anotacoes[0];
        assert!(nota.texto.contains("NF-9876"));
        assert!(nota.texto.contains("OM-001"));
        assert_eq!(nota.tecnico.as_deref(), Some(SYSTEM_TECNICO));
    }

    #[tokio::test]
    async fn create_rejects_missing_fields() {
        let svc = test_service().await;

        let mut data = cafe_order();
        data.cliente = "".to_string();
        assert!(matches!(
            svc.create(data).await,
            Err(AppError::Validation(_))
        ));

        let mut data = cafe_order();
        data.quantidade = 0;
        assert!(matches!(
            svc.create(data).await,
            Err(AppError::Validation(_))
        ));

        // Nothing persisted on a rejected create
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn assign_claims_open_order() {
        let svc = test_service().await;
        let order = svc.create(cafe_order()).await.unwrap();

        let order = svc
            .assign(order.id, OrderAssign { tecnico: "alice".to_string() })
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::EmManutencao);
        assert_eq!(order.tecnico.as_deref(), Some("alice"));
        assert_eq!(order.anotacoes.len(), 2);
        assert_eq!(
            order.anotacoes[1].texto,
            "Serviço assumido pelo técnico: alice."
        );
    }

    #[tokio::test]
    async fn second_assign_is_rejected_without_mutation() {
        let svc = test_service().await;
        let order = svc.create(cafe_order()).await.unwrap();

        svc.assign(order.id, OrderAssign { tecnico: "alice".to_string() })
            .await
            .unwrap();
        let err = svc
            .assign(order.id, OrderAssign { tecnico: "bob".to_string() })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::InvalidTransition { current: OrderStatus::EmManutencao, .. }
        ));

        // No partial application: tecnico unchanged, no extra annotation
        let order = svc.get(order.id).await.unwrap();
        assert_eq!(order.tecnico.as_deref(), Some("alice"));
        assert_eq!(order.anotacoes.len(), 2);
    }

    #[tokio::test]
    async fn finalize_requires_in_service_status() {
        let svc = test_service().await;
        let order = svc.create(cafe_order()).await.unwrap();

        // Straight from EM_ABERTO must be refused, no skipping the claim step
        let err = svc
            .finalize(
                order.id,
                OrderFinalize { nota_saida: "NFS-456".to_string(), tecnico: None },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition { current: OrderStatus::EmAberto, .. }
        ));

        svc.assign(order.id, OrderAssign { tecnico: "alice".to_string() })
            .await
            .unwrap();
        let order = svc
            .finalize(
                order.id,
                OrderFinalize {
                    nota_saida: "NFS-456".to_string(),
                    tecnico: Some("alice".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Concluido);
        assert_eq!(order.nota_saida, "NFS-456");
        assert_eq!(order.anotacoes.len(), 3);
        assert_eq!(
            order.anotacoes[2].texto,
            "Serviço CONCLUÍDO. NF de Saída/Faturamento: NFS-456."
        );

        // Concluded is terminal
        let err = svc
            .finalize(
                order.id,
                OrderFinalize { nota_saida: "NFS-999".to_string(), tecnico: None },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition { current: OrderStatus::Concluido, .. }
        ));
        let order = svc.get(order.id).await.unwrap();
        assert_eq!(order.nota_saida, "NFS-456");
        assert_eq!(order.anotacoes.len(), 3);
    }

    #[tokio::test]
    async fn finalize_rejects_empty_nota_saida() {
        let svc = test_service().await;
        let order = svc.create(cafe_order()).await.unwrap();
        svc.assign(order.id, OrderAssign { tecnico: "alice".to_string() })
            .await
            .unwrap();

        let err = svc
            .finalize(
                order.id,
                OrderFinalize { nota_saida: "  ".to_string(), tecnico: None },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Invariant holds: not concluded, nota_saida still empty
        let order = svc.get(order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::EmManutencao);
        assert_eq!(order.nota_saida, "");
    }

    #[tokio::test]
    async fn annotate_keeps_status() {
        let svc = test_service().await;
        let order = svc.create(cafe_order()).await.unwrap();

        let order = svc
            .annotate(
                order.id,
                AnnotationCreate {
                    texto: "Aguardando peça".to_string(),
                    tecnico: Some("alice".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::EmAberto);
        assert_eq!(order.anotacoes.len(), 2);
        assert_eq!(order.anotacoes[1].tecnico.as_deref(), Some("alice"));

        // Without an author the sentinel is recorded
        let order = svc
            .annotate(
                order.id,
                AnnotationCreate { texto: "Peça chegou".to_string(), tecnico: None },
            )
            .await
            .unwrap();
        assert_eq!(order.anotacoes[2].tecnico.as_deref(), Some(SYSTEM_TECNICO));
    }

    #[tokio::test]
    async fn annotate_missing_order() {
        let svc = test_service().await;
        let err = svc
            .annotate(
                999,
                AnnotationCreate { texto: "nada".to_string(), tecnico: None },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_trail() {
        let svc = test_service().await;
        let order = svc.create(cafe_order()).await.unwrap();
        svc.assign(order.id, OrderAssign { tecnico: "alice".to_string() })
            .await
            .unwrap();

        svc.delete(order.id).await.unwrap();

        assert!(matches!(svc.get(order.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            svc.annotations(order.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_returns_orders_with_trails() {
        let svc = test_service().await;
        let first = svc.create(cafe_order()).await.unwrap();

        let mut second = cafe_order();
        second.item = "Forno Industrial".to_string();
        second.cliente = "Padaria Beta".to_string();
        second.nota_entrada = "NF-8521".to_string();
        second.om = "OM-002".to_string();
        second.quantidade = 2;
        second.descricao = "Fusível queimado".to_string();
        let second = svc.create(second).await.unwrap();

        let orders = svc.list().await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, first.id);
        assert_eq!(orders[1].id, second.id);
        assert!(orders.iter().all(|o| o.anotacoes.len() == 1));
    }
}
