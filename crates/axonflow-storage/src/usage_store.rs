//! `UsageRepository` implementation writing into the `usage_events`
//! table (spec.md §6). Postgres has no unsigned integer types, so the
//! `u16`/`u32`/`u64` fields on the record types are narrowed to signed
//! columns at the write boundary only -- the in-memory record shape
//! stays unsigned everywhere else.

use crate::pool::StoragePool;
use async_trait::async_trait;
use axonflow_usage::{ApiCall, LlmRequest, UsageRepository};

pub struct PgUsageStore {
    pool: StoragePool,
}

impl PgUsageStore {
    pub fn new(pool: StoragePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageRepository for PgUsageStore {
    async fn write_api_call(&self, event: &ApiCall) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO usage_events \
             (id, event_type, org_id, client_id, instance_id, instance_type, \
              http_method, http_path, http_status, latency_ms, access_granted, created_at) \
             VALUES ($1, 'api_call', $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(event.id)
        .bind(&event.org_id)
        .bind(&event.client_id)
        .bind(&event.instance_id)
        .bind(serde_json::to_value(event.instance_type).unwrap().as_str().unwrap_or("agent").to_string())
        .bind(&event.http_method)
        .bind(&event.http_path)
        .bind(event.http_status as i32)
        .bind(event.latency_ms as i64)
        .bind(event.access_granted)
        .bind(event.created_at)
        .execute(self.pool.raw())
        .await?;
        Ok(())
    }

    async fn write_llm_request(&self, event: &LlmRequest) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO usage_events \
             (id, event_type, org_id, client_id, instance_id, instance_type, \
              http_status, provider, model, prompt_tokens, completion_tokens, total_tokens, \
              cost_cents, latency_ms, access_granted, created_at) \
             VALUES ($1, 'llm_request', $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(event.id)
        .bind(&event.org_id)
        .bind(&event.client_id)
        .bind(&event.instance_id)
        .bind(serde_json::to_value(event.instance_type).unwrap().as_str().unwrap_or("agent").to_string())
        .bind(event.http_status as i32)
        .bind(&event.provider)
        .bind(&event.model)
        .bind(event.prompt_tokens as i32)
        .bind(event.completion_tokens as i32)
        .bind(event.total_tokens as i32)
        .bind(event.cost_cents as i64)
        .bind(event.latency_ms as i64)
        .bind(event.access_granted)
        .bind(event.created_at)
        .execute(self.pool.raw())
        .await?;
        Ok(())
    }
}
