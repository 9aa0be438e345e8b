//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::entity::{
    session::{Session, SessionData},
    user::User,
};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_password::UserPassword};
use crate::error::AuthResult;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT email, password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn create(&self, user: &User) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn insert(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions (sid, sess, expire)
            VALUES ($1, $2, $3)
            ON CONFLICT (sid) DO UPDATE
            SET sess = EXCLUDED.sess, expire = EXCLUDED.expire
            "#,
        )
        .bind(session.session_id)
        .bind(Json(&session.data))
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT sid, sess, expire
            FROM user_sessions
            WHERE sid = $1 AND expire > $2
            "#,
        )
        .bind(session_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM user_sessions WHERE sid = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM user_sessions WHERE expire <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    email: String,
    password: String,
}

impl UserRow {
    fn into_user(self) -> User {
        User::new(Email::from_db(self.email), UserPassword::from_db(self.password))
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    sid: Uuid,
    sess: Json<SessionData>,
    expire: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            session_id: self.sid,
            data: self.sess.0,
            expires_at: self.expire,
        }
    }
}
