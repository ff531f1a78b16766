use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::{DbPoolError, PgPool};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to build pool: {0}")]
    PoolBuild(#[from] DbPoolError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        id: 1,
        description: "users and appointments tables",
        sql: r#"
CREATE TABLE IF NOT EXISTS swap.users (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    name TEXT NOT NULL,
    bio TEXT,
    location TEXT,
    skills_to_teach TEXT[] NOT NULL DEFAULT '{}',
    skills_to_learn TEXT[] NOT NULL DEFAULT '{}',
    rating DOUBLE PRECISION,
    total_sessions INTEGER NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_users_rating_range
        CHECK (rating IS NULL OR (rating >= 0.0 AND rating <= 5.0)),
    CONSTRAINT chk_users_total_sessions CHECK (total_sessions >= 0)
);

CREATE TABLE IF NOT EXISTS swap.appointments (
    id BIGSERIAL PRIMARY KEY,
    teacher_id BIGINT NOT NULL REFERENCES swap.users(id),
    learner_id BIGINT NOT NULL REFERENCES swap.users(id),
    skill TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    scheduled_at TIMESTAMPTZ NOT NULL,
    duration_minutes INTEGER NOT NULL DEFAULT 60,
    status TEXT NOT NULL DEFAULT 'pending',
    meeting_link TEXT,
    notes TEXT,
    rating INTEGER,
    feedback TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_appointments_parties CHECK (teacher_id <> learner_id),
    CONSTRAINT chk_appointments_duration
        CHECK (duration_minutes >= 15 AND duration_minutes <= 480),
    CONSTRAINT chk_appointments_status
        CHECK (status IN ('pending', 'accepted', 'rejected', 'completed', 'cancelled')),
    CONSTRAINT chk_appointments_rating
        CHECK (rating IS NULL OR (rating >= 1 AND rating <= 5))
);

CREATE INDEX IF NOT EXISTS idx_appointments_teacher_scheduled
    ON swap.appointments(teacher_id, scheduled_at);
CREATE INDEX IF NOT EXISTS idx_appointments_learner_scheduled
    ON swap.appointments(learner_id, scheduled_at);
CREATE INDEX IF NOT EXISTS idx_users_active
    ON swap.users(id) WHERE is_active;
"#,
    },
    Migration {
        id: 2,
        description: "one live booking per teacher per time slot",
        sql: r#"
CREATE UNIQUE INDEX IF NOT EXISTS uniq_appointments_teacher_slot
    ON swap.appointments(teacher_id, scheduled_at)
    WHERE status IN ('pending', 'accepted');
"#,
    },
];

#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS swap;
             CREATE TABLE IF NOT EXISTS swap.schema_migrations (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let already_applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM swap.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO swap.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_ids_are_unique_and_ordered() {
        let mut previous = 0;
        for migration in MIGRATIONS {
            assert!(migration.id > previous, "ids must increase");
            previous = migration.id;
        }
    }

    #[test]
    fn conflict_index_covers_only_live_statuses() {
        let sql = MIGRATIONS
            .iter()
            .find(|m| m.id == 2)
            .map(|m| m.sql)
            .unwrap();
        assert!(sql.contains("WHERE status IN ('pending', 'accepted')"));
    }
}
