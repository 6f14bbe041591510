//! `PostgreSQL` member store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crewdesk_core::{Email, MemberId, Realm};

use super::{MemberStore, RepositoryError, UpsertOutcome};
use crate::models::{Member, NewMember};

/// Internal row type for member queries.
#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    email: String,
    member_id: String,
    name: String,
    phone: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for Member {
    type Error = RepositoryError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let role = match row.role.as_str() {
            "member" => Realm::Member,
            "admin" => Realm::Admin,
            other => {
                return Err(RepositoryError::DataCorruption(format!(
                    "unknown role in database: {other}"
                )));
            }
        };

        Ok(Self {
            email,
            member_id: MemberId::new(row.member_id),
            name: row.name,
            phone: row.phone,
            role,
            created_at: row.created_at,
        })
    }
}

/// Member store backed by the `members` table.
#[derive(Clone)]
pub struct PgMemberStore {
    pool: PgPool,
}

impl PgMemberStore {
    /// Create a new member store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberStore for PgMemberStore {
    async fn upsert_if_absent(&self, member: &NewMember) -> Result<UpsertOutcome, RepositoryError> {
        // ON CONFLICT DO NOTHING is the concurrency-safe primitive here: two
        // first logins racing on the same email resolve to one row, with the
        // loser reported as AlreadyRegistered rather than overwriting.
        let result = sqlx::query(
            r"
            INSERT INTO members (email, member_id, name, phone, role)
            VALUES ($1, $2, $3, $4, 'member')
            ON CONFLICT (email) DO NOTHING
            ",
        )
        .bind(member.email.as_str())
        .bind(member.member_id.as_str())
        .bind(&member.name)
        .bind(&member.phone)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            Ok(UpsertOutcome::Inserted)
        } else {
            Ok(UpsertOutcome::AlreadyRegistered)
        }
    }

    async fn list_all(&self) -> Result<Vec<Member>, RepositoryError> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            r"
            SELECT email, member_id, name, phone, role, created_at
            FROM members
            ORDER BY created_at
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
