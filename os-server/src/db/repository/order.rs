//! Ordem de Serviço Repository
//!
//! Low-level CRUD for orders and their annotations. Lifecycle mutations are
//! exposed only as compare-and-set primitives executed inside a caller-owned
//! transaction; [`crate::orders::OrderService`] is the sole caller, so a bare
//! "set status" is never reachable from the API layer.

use super::{RepoError, RepoResult};
use shared::models::{Annotation, Order, OrderCreate, OrderStatus};
use sqlx::{SqliteConnection, SqlitePool};

const ORDER_COLUMNS: &str =
    "id, item, cliente, nota_entrada, nota_saida, descricao, om, quantidade, status, data_entrada, tecnico";

/// Find one order, without its annotations.
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM service_order WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(order)
}

/// Find one order with its full audit trail. `NotFound` if absent.
pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Order> {
    let mut order = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Ordem de serviço {id} não encontrada")))?;
    order.anotacoes = find_annotations(pool, id).await?;
    Ok(order)
}

/// List all orders with their annotations, ordered by id.
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let mut orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM service_order ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    // One pass over all annotations instead of a query per order
    let annotations = sqlx::query_as::<_, Annotation>(
        "SELECT id, texto, tecnico, data, order_id FROM annotation ORDER BY order_id, data, id",
    )
    .fetch_all(pool)
    .await?;

    let mut by_order: std::collections::HashMap<i64, Vec<Annotation>> =
        std::collections::HashMap::new();
    for a in annotations {
        by_order.entry(a.order_id).or_default().push(a);
    }
    for order in &mut orders {
        if let Some(list) = by_order.remove(&order.id) {
            order.anotacoes = list;
        }
    }
    Ok(orders)
}

/// Annotations of one order in creation order (data, then id as tiebreak).
/// `NotFound` if the order itself is absent; orphan annotations cannot exist.
pub async fn find_annotations(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<Annotation>> {
    if get_status(pool, order_id).await?.is_none() {
        return Err(RepoError::NotFound(format!(
            "Ordem de serviço {order_id} não encontrada"
        )));
    }
    let annotations = sqlx::query_as::<_, Annotation>(
        "SELECT id, texto, tecnico, data, order_id FROM annotation WHERE order_id = ? ORDER BY data, id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(annotations)
}

/// Current status of an order, `None` if it does not exist.
pub async fn get_status(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderStatus>> {
    let status = sqlx::query_scalar::<_, OrderStatus>(
        "SELECT status FROM service_order WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(status)
}

/// Same as [`get_status`] but inside an open transaction.
pub async fn get_status_tx(
    conn: &mut SqliteConnection,
    id: i64,
) -> RepoResult<Option<OrderStatus>> {
    let status = sqlx::query_scalar::<_, OrderStatus>(
        "SELECT status FROM service_order WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(status)
}

/// Insert a new order in status `EM_ABERTO`, returning its id.
pub async fn insert_order(
    conn: &mut SqliteConnection,
    data: &OrderCreate,
    now: i64,
) -> RepoResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO service_order (item, cliente, nota_entrada, nota_saida, descricao, om, quantidade, status, data_entrada, tecnico) \
         VALUES (?, ?, ?, '', ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.item)
    .bind(&data.cliente)
    .bind(&data.nota_entrada)
    .bind(&data.descricao)
    .bind(&data.om)
    .bind(data.quantidade)
    .bind(OrderStatus::EmAberto)
    .bind(now)
    .bind(&data.tecnico)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Append an annotation to an order, returning its id.
///
/// The FK constraint rejects orphan rows; callers are expected to have
/// verified the order inside the same transaction.
pub async fn insert_annotation(
    conn: &mut SqliteConnection,
    order_id: i64,
    texto: &str,
    tecnico: Option<&str>,
    now: i64,
) -> RepoResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO annotation (texto, tecnico, data, order_id) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(texto)
    .bind(tecnico)
    .bind(now)
    .bind(order_id)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Compare-and-set lifecycle transition: move the order from `from` to `to`
/// and record the acting technician, in one atomic statement.
///
/// Returns `false` when no row matched — the order is either absent or not
/// in `from`; the caller reads the status inside the same transaction to
/// tell the two apart. `nota_saida`, when given, is set together with the
/// status so the "non-empty iff concluded" invariant never has a window.
pub async fn transition(
    conn: &mut SqliteConnection,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
    tecnico: Option<&str>,
    nota_saida: Option<&str>,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE service_order SET status = ?, tecnico = COALESCE(?, tecnico), \
         nota_saida = COALESCE(?, nota_saida) WHERE id = ? AND status = ?",
    )
    .bind(to)
    .bind(tecnico)
    .bind(nota_saida)
    .bind(id)
    .bind(from)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Delete an order and all of its annotations atomically.
///
/// Children are removed explicitly inside the transaction rather than
/// trusting FK metadata alone; a concurrent reader sees either the whole
/// order or nothing.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM annotation WHERE order_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let rows = sqlx::query("DELETE FROM service_order WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if rows.rows_affected() == 0 {
        // Nothing deleted; the implicit rollback keeps the store untouched
        return Err(RepoError::NotFound(format!(
            "Ordem de serviço {id} não encontrada"
        )));
    }

    tx.commit().await?;
    Ok(())
}
