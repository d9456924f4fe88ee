//! Concurrency tests against a file-backed database.
//!
//! In-memory SQLite gives every connection its own database, so these tests
//! run through [`DbService`] on a temp file to get the same WAL pool the
//! server uses in production.

use os_server::db::DbService;
use os_server::{AppError, OrderService};
use shared::models::{OrderAssign, OrderCreate, OrderFinalize, OrderStatus};

async fn service(dir: &tempfile::TempDir) -> OrderService {
    let db_path = dir.path().join("os.db");
    let db = DbService::new(db_path.to_str().unwrap())
        .await
        .expect("db init");
    OrderService::new(db.pool.clone())
}

fn sample_order() -> OrderCreate {
    OrderCreate {
        item: "Compressor".into(),
        cliente: "Oficina Beta".into(),
        nota_entrada: "NF-1001".into(),
        om: "OM-042".into(),
        quantidade: 1,
        descricao: "Não liga".into(),
        tecnico: None,
    }
}

#[tokio::test]
async fn concurrent_assign_has_exactly_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(&dir).await;

    let order = svc.create(sample_order()).await.unwrap();
    let id = order.id;

    let a = {
        let svc = svc.clone();
        tokio::spawn(async move {
            svc.assign(
                id,
                OrderAssign {
                    tecnico: "Carlos".into(),
                },
            )
            .await
        })
    };
    let b = {
        let svc = svc.clone();
        tokio::spawn(async move {
            svc.assign(
                id,
                OrderAssign {
                    tecnico: "Marina".into(),
                },
            )
            .await
        })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one technician may claim the order");

    let loss = results.iter().find(|r| r.is_err()).unwrap();
    match loss {
        Err(AppError::InvalidTransition { order_id, current }) => {
            assert_eq!(*order_id, id);
            assert_eq!(*current, OrderStatus::EmManutencao);
        }
        other => panic!("loser should get InvalidTransition, got {other:?}"),
    }

    // The winner's name stuck and only the winner's annotation was appended.
    let after = svc.get(id).await.unwrap();
    assert_eq!(after.status, OrderStatus::EmManutencao);
    let winner = results
        .iter()
        .find_map(|r| r.as_ref().ok())
        .and_then(|o| o.tecnico.clone())
        .unwrap();
    assert_eq!(after.tecnico.as_deref(), Some(winner.as_str()));
    assert_eq!(after.anotacoes.len(), 2); // intake + assign
}

#[tokio::test]
async fn full_lifecycle_on_shared_pool() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(&dir).await;

    let order = svc.create(sample_order()).await.unwrap();
    assert_eq!(order.status, OrderStatus::EmAberto);

    let order = svc
        .assign(
            order.id,
            OrderAssign {
                tecnico: "Carlos".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::EmManutencao);

    // Completing an order that was never claimed is rejected, but the normal
    // path closes it and records the outbound receipt.
    let order = svc
        .finalize(
            order.id,
            OrderFinalize {
                nota_saida: "NF-2002".into(),
                tecnico: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Concluido);
    assert_eq!(order.nota_saida, "NF-2002");
    assert_eq!(order.anotacoes.len(), 3);

    // Terminal: no further transitions.
    let err = svc
        .assign(
            order.id,
            OrderAssign {
                tecnico: "Marina".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}
