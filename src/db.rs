//! Database connection management and schema bootstrap.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

/// PostgreSQL connection pool wrapper.
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create tables if absent. Idempotent; runs at boot.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS districts (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        state TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS schools (
        id UUID PRIMARY KEY,
        district_id UUID NOT NULL REFERENCES districts(id) ON DELETE CASCADE,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS teachers (
        id UUID PRIMARY KEY,
        school_id UUID NOT NULL REFERENCES schools(id) ON DELETE CASCADE,
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL,
        password_hash TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id UUID PRIMARY KEY,
        district_id UUID NOT NULL REFERENCES districts(id) ON DELETE CASCADE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        dob TEXT NOT NULL,
        unique_student_identifier TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS classrooms (
        id UUID PRIMARY KEY,
        teacher_id UUID NOT NULL REFERENCES teachers(id) ON DELETE CASCADE,
        school_id UUID NOT NULL REFERENCES schools(id) ON DELETE CASCADE,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enrollments (
        id UUID PRIMARY KEY,
        classroom_id UUID NOT NULL REFERENCES classrooms(id) ON DELETE CASCADE,
        student_id UUID NOT NULL REFERENCES students(id) ON DELETE CASCADE,
        UNIQUE (classroom_id, student_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS records (
        id UUID PRIMARY KEY,
        student_id UUID NOT NULL REFERENCES students(id) ON DELETE CASCADE,
        teacher_id UUID NOT NULL REFERENCES teachers(id) ON DELETE CASCADE,
        grade_level TEXT NOT NULL,
        subject TEXT NOT NULL,
        file_url TEXT NOT NULL,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS student_transfers (
        id UUID PRIMARY KEY,
        student_id UUID NOT NULL REFERENCES students(id) ON DELETE CASCADE,
        old_district_id UUID NOT NULL REFERENCES districts(id) ON DELETE CASCADE,
        new_district_id UUID REFERENCES districts(id) ON DELETE SET NULL,
        old_school_id UUID REFERENCES schools(id) ON DELETE SET NULL,
        new_school_id UUID REFERENCES schools(id) ON DELETE SET NULL,
        requested_by UUID NOT NULL REFERENCES teachers(id) ON DELETE CASCADE,
        approved_by UUID REFERENCES teachers(id) ON DELETE SET NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        proof_file_url TEXT,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_students_district ON students(district_id)",
    "CREATE INDEX IF NOT EXISTS idx_transfers_status ON student_transfers(status)",
    "CREATE INDEX IF NOT EXISTS idx_records_student ON records(student_id)",
];
