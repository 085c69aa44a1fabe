//! Session store — persistence seam for per-user quiz progress.
//!
//! Carried in `AppState` as `Arc<dyn SessionStore>` so the Postgres backend
//! can be swapped for an in-memory one in tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::quiz::models::QuizSession;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: &QuizSession) -> Result<(), AppError>;
    /// NotFound if the session does not exist (never created, completed, or swept).
    async fn get(&self, id: Uuid) -> Result<QuizSession, AppError>;
    /// Persists the current pointer, interests, answers, and activity timestamp.
    /// Last-write-wins; no concurrent mutation of one session is expected.
    async fn save(&self, session: &QuizSession) -> Result<(), AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
    /// Removes sessions idle since before `cutoff`, returning the count.
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}

// ── Postgres implementation ─────────────────────────────────────────────────

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    id: Uuid,
    module_id: String,
    current_question_id: String,
    interests: serde_json::Value,
    answers: serde_json::Value,
    last_activity: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Result<QuizSession, AppError> {
        let interests: BTreeSet<String> = serde_json::from_value(self.interests)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt interests column: {e}")))?;
        let answers: BTreeMap<String, String> = serde_json::from_value(self.answers)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt answers column: {e}")))?;
        Ok(QuizSession {
            id: self.id,
            module_id: self.module_id,
            current_question_id: self.current_question_id,
            interests,
            answers,
            last_activity: self.last_activity,
        })
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: &QuizSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO quiz_sessions (id, module_id, current_question_id, interests, answers, last_activity)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id)
        .bind(&session.module_id)
        .bind(&session.current_question_id)
        .bind(serde_json::to_value(&session.interests).map_err(anyhow::Error::from)?)
        .bind(serde_json::to_value(&session.answers).map_err(anyhow::Error::from)?)
        .bind(session.last_activity)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<QuizSession, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, module_id, current_question_id, interests, answers, last_activity \
             FROM quiz_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;

        row.into_session()
    }

    async fn save(&self, session: &QuizSession) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE quiz_sessions
            SET current_question_id = $2, interests = $3, answers = $4, last_activity = $5
            WHERE id = $1
            "#,
        )
        .bind(session.id)
        .bind(&session.current_question_id)
        .bind(serde_json::to_value(&session.interests).map_err(anyhow::Error::from)?)
        .bind(serde_json::to_value(&session.answers).map_err(anyhow::Error::from)?)
        .bind(session.last_activity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Session {} not found",
                session.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM quiz_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM quiz_sessions WHERE last_activity < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// ── Expiry sweep ────────────────────────────────────────────────────────────

/// Spawns the background sweep that expires abandoned sessions. Clients that
/// walk away mid-quiz leave orphaned rows; the sweep keeps the table bounded.
pub fn spawn_session_sweeper(store: Arc<dyn SessionStore>, ttl_minutes: i64) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            tick.tick().await;
            let cutoff = Utc::now() - Duration::minutes(ttl_minutes);
            match store.delete_expired(cutoff).await {
                Ok(0) => {}
                Ok(n) => info!("Expired {n} abandoned quiz sessions"),
                Err(e) => warn!("Session sweep failed: {e}"),
            }
        }
    });
}

// ── In-memory implementation (tests) ────────────────────────────────────────
