use std::sync::Arc;

use application::{MessageRepository, ParticipantRepository};
use async_trait::async_trait;
use domain::{
    Message, MessageId, MessageKind, MessageText, Participant, ParticipantName, Recipient,
    RepositoryError, Timestamp,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict;
        }
    }
    RepositoryError::storage(err.to_string())
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

#[derive(Debug, FromRow)]
struct ParticipantRecord {
    name: String,
    last_status: OffsetDateTime,
}

impl TryFrom<ParticipantRecord> for Participant {
    type Error = RepositoryError;

    fn try_from(value: ParticipantRecord) -> Result<Self, Self::Error> {
        let name =
            ParticipantName::parse(&value.name).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Participant {
            name,
            last_status: value.last_status,
        })
    }
}

#[derive(Debug, FromRow)]
struct MessageRecord {
    id: Uuid,
    sender: String,
    recipient: String,
    text: String,
    kind: String,
    time: String,
    created_at: OffsetDateTime,
}

impl TryFrom<MessageRecord> for Message {
    type Error = RepositoryError;

    fn try_from(value: MessageRecord) -> Result<Self, Self::Error> {
        let from =
            ParticipantName::parse(&value.sender).map_err(|err| invalid_data(err.to_string()))?;
        let to = Recipient::parse(&value.recipient).map_err(|err| invalid_data(err.to_string()))?;
        let text = MessageText::parse(&value.text).map_err(|err| invalid_data(err.to_string()))?;
        let kind = MessageKind::parse(&value.kind).map_err(|err| invalid_data(err.to_string()))?;

        Ok(Message {
            id: MessageId::from(value.id),
            from,
            to,
            text,
            kind,
            time: value.time,
            created_at: value.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgParticipantRepository {
    pool: PgPool,
}

impl PgParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PgParticipantRepository {
    async fn insert(&self, participant: Participant) -> Result<Participant, RepositoryError> {
        let record = sqlx::query_as::<_, ParticipantRecord>(
            r#"
            INSERT INTO participants (name, last_status)
            VALUES ($1, $2)
            RETURNING name, last_status
            "#,
        )
        .bind(participant.name.as_str())
        .bind(participant.last_status)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Participant::try_from(record)
    }

    async fn find_by_name(
        &self,
        name: &ParticipantName,
    ) -> Result<Option<Participant>, RepositoryError> {
        let record = sqlx::query_as::<_, ParticipantRecord>(
            r#"
            SELECT name, last_status
            FROM participants
            WHERE name = $1
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Participant::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Participant>, RepositoryError> {
        let records = sqlx::query_as::<_, ParticipantRecord>(
            r#"
            SELECT name, last_status
            FROM participants
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Participant::try_from).collect()
    }

    async fn touch(&self, name: &ParticipantName, at: Timestamp) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE participants
            SET last_status = $2
            WHERE name = $1
            "#,
        )
        .bind(name.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_stale(&self, cutoff: Timestamp) -> Result<Vec<Participant>, RepositoryError> {
        let records = sqlx::query_as::<_, ParticipantRecord>(
            r#"
            SELECT name, last_status
            FROM participants
            WHERE last_status < $1
            ORDER BY name
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Participant::try_from).collect()
    }

    async fn remove_stale(
        &self,
        name: &ParticipantName,
        cutoff: Timestamp,
    ) -> Result<bool, RepositoryError> {
        // 条件删除：期间刷新过心跳的参与者不会被误删
        let result = sqlx::query(
            r#"
            DELETE FROM participants
            WHERE name = $1 AND last_status < $2
            "#,
        )
        .bind(name.as_str())
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn insert(&self, message: Message) -> Result<Message, RepositoryError> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (id, sender, recipient, text, kind, time, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, sender, recipient, text, kind, time, created_at
            "#,
        )
        .bind(Uuid::from(message.id))
        .bind(message.from.as_str())
        .bind(message.to.as_str())
        .bind(message.text.as_str())
        .bind(message.kind.as_str())
        .bind(&message.time)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Message::try_from(record)
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, sender, recipient, text, kind, time, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Message::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Message>, RepositoryError> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, sender, recipient, text, kind, time, created_at
            FROM messages
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Message::try_from).collect()
    }

    async fn delete(&self, id: MessageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
    pub participant_repository: Arc<PgParticipantRepository>,
    pub message_repository: Arc<PgMessageRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            participant_repository: Arc::new(PgParticipantRepository::new(pool.clone())),
            message_repository: Arc::new(PgMessageRepository::new(pool.clone())),
            pool,
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
