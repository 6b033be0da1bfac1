//! Connection pool setup against the transactional row store (spec.md
//! §2: "a relational store is the expected implementation").

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Thin wrapper so call sites depend on `StoragePool` rather than a raw
/// `sqlx::PgPool`, the way the teacher wraps its own connection handles
/// in `ee/core/connection.rs`.
#[derive(Clone)]
pub struct StoragePool {
    pool: PgPool,
}

impl StoragePool {
    /// Connects with pool settings matching the SQL connector defaults
    /// from spec.md §4.5 (25 max, 5 idle).
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(25)
            .min_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn raw(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `policies`, `policy_overrides` and `usage_events`
    /// tables (spec.md §6) if they don't already exist. A real
    /// deployment runs this via a migration tool instead; exposed here
    /// so a fresh community install can stand up schema without one.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS policies (
                policy_id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                tier TEXT NOT NULL,
                category TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                pattern TEXT,
                severity TEXT,
                action TEXT,
                policy_type TEXT,
                conditions_json JSONB,
                actions_json JSONB,
                priority INTEGER NOT NULL DEFAULT 0,
                enabled BOOLEAN NOT NULL DEFAULT TRUE,
                tenant_id TEXT,
                org_id TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS policy_overrides (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                policy_id TEXT NOT NULL REFERENCES policies(policy_id),
                scope TEXT NOT NULL,
                scope_id TEXT NOT NULL,
                action_override TEXT,
                enabled_override BOOLEAN,
                reason TEXT NOT NULL,
                created_by TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS usage_events (
                id UUID PRIMARY KEY,
                event_type TEXT NOT NULL,
                org_id TEXT NOT NULL,
                client_id TEXT,
                instance_id TEXT NOT NULL,
                instance_type TEXT NOT NULL,
                http_method TEXT,
                http_path TEXT,
                http_status INTEGER NOT NULL,
                provider TEXT,
                model TEXT,
                prompt_tokens INTEGER,
                completion_tokens INTEGER,
                total_tokens INTEGER,
                cost_cents BIGINT,
                latency_ms BIGINT NOT NULL,
                access_granted BOOLEAN NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
