//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` and `AgencyCatalog` ports from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use carefinder_core::domain::{
    Agency, AgencyLocation, Conversation, ConversationSummary, Exchange, ProfileUpdate,
    SenderRole, UserProfile,
};
use carefinder_core::ports::{AgencyCatalog, DatabaseService, PortError, PortResult};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ProfileRecord {
    email: String,
    name: Option<String>,
    profile_pic: Option<String>,
    phone: Option<String>,
    age: Option<i32>,
    address: Option<String>,
    medical_history: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl ProfileRecord {
    fn to_domain(self) -> UserProfile {
        UserProfile {
            email: self.email,
            name: self.name,
            profile_pic: self.profile_pic,
            phone: self.phone,
            age: self.age,
            address: self.address,
            medical_history: self.medical_history,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct AgencyRecord {
    id: String,
    name: String,
    city: String,
    area: String,
    services: Vec<String>,
    rating: f64,
    contact: String,
    policy: String,
}
impl AgencyRecord {
    fn to_domain(self) -> Agency {
        Agency {
            id: self.id,
            name: self.name,
            location: AgencyLocation {
                city: self.city,
                area: self.area,
            },
            services: self.services,
            rating: self.rating,
            contact: self.contact,
            policy: self.policy,
        }
    }
}

#[derive(FromRow)]
struct ConversationRecord {
    id: Uuid,
    user_email: String,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct ExchangeRecord {
    role: String,
    text: String,
    created_at: DateTime<Utc>,
}
impl ExchangeRecord {
    fn to_domain(self) -> PortResult<Exchange> {
        let role = SenderRole::parse(&self.role).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown exchange role '{}'", self.role))
        })?;
        Ok(Exchange {
            role,
            text: self.text,
            timestamp: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct SummaryRecord {
    id: Uuid,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    message_count: i64,
}
impl SummaryRecord {
    fn to_domain(self) -> ConversationSummary {
        ConversationSummary {
            id: self.id,
            title: self.title,
            created_at: self.created_at,
            updated_at: self.updated_at,
            message_count: self.message_count,
        }
    }
}

const PROFILE_COLUMNS: &str =
    "email, name, profile_pic, phone, age, address, medical_history, created_at, updated_at";

/// Merges inside the statement: a NULL submission keeps the stored column.
const UPSERT_PROFILE_SQL: &str = "INSERT INTO user_profiles
        (email, name, profile_pic, phone, age, address, medical_history, created_at, updated_at)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
     ON CONFLICT (email) DO UPDATE SET
        name = COALESCE(EXCLUDED.name, user_profiles.name),
        profile_pic = COALESCE(EXCLUDED.profile_pic, user_profiles.profile_pic),
        phone = COALESCE(EXCLUDED.phone, user_profiles.phone),
        age = COALESCE(EXCLUDED.age, user_profiles.age),
        address = COALESCE(EXCLUDED.address, user_profiles.address),
        medical_history = COALESCE(EXCLUDED.medical_history, user_profiles.medical_history),
        updated_at = EXCLUDED.updated_at
     RETURNING email, name, profile_pic, phone, age, address, medical_history, created_at, updated_at";

const LIST_CONVERSATIONS_SQL: &str =
    "SELECT c.id, c.title, c.created_at, c.updated_at, COUNT(e.id) AS message_count
     FROM conversations c
     LEFT JOIN conversation_exchanges e ON e.conversation_id = c.id
     WHERE c.user_email = $1
     GROUP BY c.id
     ORDER BY c.updated_at DESC, c.id
     LIMIT $2 OFFSET $3";

async fn insert_exchanges(
    tx: &mut Transaction<'_, Postgres>,
    conversation_id: Uuid,
    exchanges: &[Exchange],
) -> PortResult<()> {
    for exchange in exchanges {
        sqlx::query(
            "INSERT INTO conversation_exchanges (conversation_id, role, text, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(conversation_id)
        .bind(exchange.role.as_str())
        .bind(&exchange.text)
        .bind(exchange.timestamp)
        .execute(&mut **tx)
        .await
        .map_err(unexpected)?;
    }
    Ok(())
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn get_profile(&self, email: &str) -> PortResult<UserProfile> {
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            "SELECT {} FROM user_profiles WHERE email = $1",
            PROFILE_COLUMNS
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Profile {} not found", email)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn upsert_profile(&self, update: ProfileUpdate) -> PortResult<UserProfile> {
        let update = update.without_blanks();
        let now = Utc::now();

        let record = sqlx::query_as::<_, ProfileRecord>(UPSERT_PROFILE_SQL)
            .bind(&update.email)
            .bind(&update.name)
            .bind(&update.profile_pic)
            .bind(&update.phone)
            .bind(update.age)
            .bind(&update.address)
            .bind(&update.medical_history)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        debug!("Upserted profile {}", record.email);
        Ok(record.to_domain())
    }

    async fn list_agencies(&self) -> PortResult<Vec<Agency>> {
        let records = sqlx::query_as::<_, AgencyRecord>(
            "SELECT id, name, city, area, services, rating, contact, policy FROM agencies ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn replace_agencies(&self, agencies: Vec<Agency>) -> PortResult<usize> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("DELETE FROM agencies")
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        for agency in &agencies {
            sqlx::query(
                "INSERT INTO agencies (id, name, city, area, services, rating, contact, policy)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name, city = EXCLUDED.city, area = EXCLUDED.area,
                    services = EXCLUDED.services, rating = EXCLUDED.rating,
                    contact = EXCLUDED.contact, policy = EXCLUDED.policy",
            )
            .bind(&agency.id)
            .bind(&agency.name)
            .bind(&agency.location.city)
            .bind(&agency.location.area)
            .bind(&agency.services)
            .bind(agency.rating)
            .bind(&agency.contact)
            .bind(&agency.policy)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }

        tx.commit().await.map_err(unexpected)?;
        info!("Replaced agency catalog with {} entries", agencies.len());
        Ok(agencies.len())
    }

    async fn get_conversation(&self, conversation_id: Uuid) -> PortResult<Conversation> {
        let record = sqlx::query_as::<_, ConversationRecord>(
            "SELECT id, user_email, title, created_at, updated_at FROM conversations WHERE id = $1",
        )
        .bind(conversation_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Conversation {} not found", conversation_id))
            }
            _ => unexpected(e),
        })?;

        let exchanges = sqlx::query_as::<_, ExchangeRecord>(
            "SELECT role, text, created_at FROM conversation_exchanges WHERE conversation_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?
        .into_iter()
        .map(ExchangeRecord::to_domain)
        .collect::<PortResult<Vec<_>>>()?;

        Ok(Conversation {
            id: record.id,
            user_email: record.user_email,
            title: record.title,
            created_at: record.created_at,
            updated_at: record.updated_at,
            exchanges,
        })
    }

    async fn create_conversation(
        &self,
        user_email: &str,
        title: &str,
        exchanges: Vec<Exchange>,
    ) -> PortResult<Conversation> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let record = sqlx::query_as::<_, ConversationRecord>(
            "INSERT INTO conversations (id, user_email, title, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING id, user_email, title, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_email)
        .bind(title)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        insert_exchanges(&mut tx, record.id, &exchanges).await?;
        tx.commit().await.map_err(unexpected)?;

        Ok(Conversation {
            id: record.id,
            user_email: record.user_email,
            title: record.title,
            created_at: record.created_at,
            updated_at: record.updated_at,
            exchanges,
        })
    }

    async fn append_exchanges(
        &self,
        conversation_id: Uuid,
        exchanges: Vec<Exchange>,
        title: Option<String>,
    ) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let updated = sqlx::query(
            "UPDATE conversations SET updated_at = $2, title = COALESCE($3, title) WHERE id = $1",
        )
        .bind(conversation_id)
        .bind(Utc::now())
        .bind(title)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        if updated.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Conversation {} not found",
                conversation_id
            )));
        }

        insert_exchanges(&mut tx, conversation_id, &exchanges).await?;
        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn list_conversations(
        &self,
        user_email: &str,
        page: u32,
        limit: u32,
    ) -> PortResult<Vec<ConversationSummary>> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let records = sqlx::query_as::<_, SummaryRecord>(LIST_CONVERSATIONS_SQL)
        .bind(user_email)
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

//=========================================================================================
// `AgencyCatalog` Trait Implementation
//=========================================================================================

#[async_trait]
impl AgencyCatalog for DbAdapter {
    async fn list_agencies(&self) -> PortResult<Vec<Agency>> {
        DatabaseService::list_agencies(self).await
    }
}
