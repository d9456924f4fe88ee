//! User Repository
//!
//! Thin identity collaborator: lookup and credential verification only.
//! Passwords are stored as Argon2 hashes.

use super::{RepoError, RepoResult};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use shared::models::User;
use sqlx::SqlitePool;

/// Hash a plaintext password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(
    password: &str,
    hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM user ORDER BY username",
    )
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM user WHERE username = ? LIMIT 1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Create a new user. `Duplicate` if the username is taken.
pub async fn create(pool: &SqlitePool, username: &str, password: &str) -> RepoResult<User> {
    if find_by_username(pool, username).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Username '{username}' already exists"
        )));
    }

    let password_hash = hash_password(password)
        .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))?;
    let now = shared::util::now_millis();

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO user (username, password_hash, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(username)
    .bind(&password_hash)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(User {
        id,
        username: username.to_string(),
        password_hash,
        created_at: now,
    })
}

/// Seed the bootstrap user when the table is empty. Returns `true` when a
/// user was created.
pub async fn ensure_admin(pool: &SqlitePool, username: &str, password: &str) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(false);
    }
    create(pool, username, password).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    #[tokio::test]
    async fn create_and_verify() {
        let pool = test_pool().await;
        let user = create(&pool, "alice", "s3cret").await.unwrap();

        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "s3cret");
        assert!(verify_password("s3cret", &user.password_hash).unwrap());
        assert!(!verify_password("wrong", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let pool = test_pool().await;
        create(&pool, "alice", "a").await.unwrap();
        assert!(matches!(
            create(&pool, "alice", "b").await,
            Err(RepoError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let pool = test_pool().await;
        assert!(ensure_admin(&pool, "admin", "123").await.unwrap());
        assert!(!ensure_admin(&pool, "admin", "123").await.unwrap());
        assert_eq!(find_all(&pool).await.unwrap().len(), 1);
    }
}
