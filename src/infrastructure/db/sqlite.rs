use crate::domain::chat::{ChatMessage, ChatRole};
use crate::domain::dataset::{AnalysisRecord, Dataset, DatasetRecord, DatasetSummary, Row};
use crate::domain::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;

const SCHEMA: &str = include_str!("../../../resources/schema.sql");

const INSERT_CHAT_MESSAGE: &str = "INSERT INTO chat_messages (id, role, content, timestamp, dataset_id)
     VALUES (?, ?, ?, ?, ?)";

const INSERT_ANALYSIS: &str = "INSERT INTO analysis_results (id, dataset_id, query, results, created_at)
     VALUES (?, ?, ?, ?, ?)";

/// Persistence for uploaded datasets, chat transcripts and analysis runs
pub struct DatasetRepository {
    pool: SqlitePool,
}

impl DatasetRepository {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to parse connection string: {}", e))
            })?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        if !in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        // Every connection to `:memory:` would see its own empty database
        let max_connections = if in_memory { 1 } else { 4 };

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5));
        if in_memory {
            // Recycling the only connection would drop the database with it
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {}", e)))?;

        let repository = Self { pool };
        repository.apply_schema().await?;
        Ok(repository)
    }

    async fn apply_schema(&self) -> Result<()> {
        for statement in SCHEMA.split(';') {
            let stmt = statement.trim();
            if stmt.is_empty() {
                continue;
            }
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to apply schema statement: {}", e))
                })?;
        }
        Ok(())
    }

    pub async fn insert_dataset(&self, record: &DatasetRecord) -> Result<()> {
        let columns = to_json(record.dataset.columns())?;
        let data = to_json(record.dataset.rows())?;

        sqlx::query(
            "INSERT INTO datasets (id, name, uploaded_at, row_count, columns, data)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.uploaded_at)
        .bind(record.dataset.row_count() as i64)
        .bind(columns)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to save dataset: {}", e)))?;

        Ok(())
    }

    pub async fn get_dataset(&self, id: &str) -> Result<DatasetRecord> {
        let entity = sqlx::query_as::<_, DatasetEntity>(
            "SELECT id, name, uploaded_at, columns, data FROM datasets WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch dataset: {}", e)))?;

        match entity {
            Some(entity) => entity.try_into(),
            None => Err(AppError::NotFound(format!("Dataset not found: {}", id))),
        }
    }

    pub async fn list_datasets(&self) -> Result<Vec<DatasetSummary>> {
        let entities = sqlx::query_as::<_, DatasetSummaryEntity>(
            "SELECT id, name, uploaded_at, row_count, columns FROM datasets
             ORDER BY uploaded_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list datasets: {}", e)))?;

        entities.into_iter().map(DatasetSummary::try_from).collect()
    }

    pub async fn insert_chat_message(&self, message: &ChatMessage) -> Result<()> {
        sqlx::query(INSERT_CHAT_MESSAGE)
            .bind(&message.id)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(message.timestamp)
            .bind(&message.dataset_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to save chat message: {}", e)))?;

        Ok(())
    }

    /// Store a chat exchange and its analysis atomically; on failure nothing is kept
    pub async fn insert_chat_exchange(
        &self,
        messages: &[ChatMessage],
        analysis: Option<&AnalysisRecord>,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to start chat tx: {}", e)))?;

        for message in messages {
            sqlx::query(INSERT_CHAT_MESSAGE)
                .bind(&message.id)
                .bind(message.role.as_str())
                .bind(&message.content)
                .bind(message.timestamp)
                .bind(&message.dataset_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to save chat message: {}", e))
                })?;
        }

        if let Some(record) = analysis {
            let results = to_json(&record.results)?;
            sqlx::query(INSERT_ANALYSIS)
                .bind(&record.id)
                .bind(&record.dataset_id)
                .bind(&record.query)
                .bind(results)
                .bind(record.created_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to save analysis: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit chat tx: {}", e)))?;

        Ok(())
    }

    /// Messages tied to a dataset, oldest first
    pub async fn list_chat_messages(&self, dataset_id: &str) -> Result<Vec<ChatMessage>> {
        let entities = sqlx::query_as::<_, ChatMessageEntity>(
            "SELECT id, role, content, timestamp, dataset_id FROM chat_messages
             WHERE dataset_id = ? ORDER BY timestamp ASC, rowid ASC",
        )
        .bind(dataset_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list chat messages: {}", e)))?;

        entities.into_iter().map(ChatMessage::try_from).collect()
    }

    pub async fn insert_analysis(&self, record: &AnalysisRecord) -> Result<()> {
        let results = to_json(&record.results)?;

        sqlx::query(INSERT_ANALYSIS)
            .bind(&record.id)
            .bind(&record.dataset_id)
            .bind(&record.query)
            .bind(results)
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to save analysis: {}", e)))?;

        Ok(())
    }

    pub async fn count_analyses(&self, dataset_id: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM analysis_results WHERE dataset_id = ?")
            .bind(dataset_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count analyses: {}", e)))
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| AppError::Internal(format!("Failed to serialize record: {}", e)))
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str, what: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::DatabaseError(format!("Corrupt {} column: {}", what, e)))
}

// Internal entities for database mapping
#[derive(sqlx::FromRow)]
struct DatasetEntity {
    id: String,
    name: String,
    uploaded_at: DateTime<Utc>,
    columns: String,
    data: String,
}

impl TryFrom<DatasetEntity> for DatasetRecord {
    type Error = AppError;

    fn try_from(e: DatasetEntity) -> Result<Self> {
        let columns: Vec<String> = from_json(&e.columns, "columns")?;
        let rows: Vec<Row> = from_json(&e.data, "data")?;

        Ok(Self {
            id: e.id,
            name: e.name,
            uploaded_at: e.uploaded_at,
            dataset: Dataset::new(columns, rows),
        })
    }
}

#[derive(sqlx::FromRow)]
struct DatasetSummaryEntity {
    id: String,
    name: String,
    uploaded_at: DateTime<Utc>,
    row_count: i64,
    columns: String,
}

impl TryFrom<DatasetSummaryEntity> for DatasetSummary {
    type Error = AppError;

    fn try_from(e: DatasetSummaryEntity) -> Result<Self> {
        Ok(Self {
            id: e.id,
            name: e.name,
            uploaded_at: e.uploaded_at,
            row_count: e.row_count.max(0) as usize,
            columns: from_json(&e.columns, "columns")?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ChatMessageEntity {
    id: String,
    role: String,
    content: String,
    timestamp: DateTime<Utc>,
    dataset_id: Option<String>,
}

impl TryFrom<ChatMessageEntity> for ChatMessage {
    type Error = AppError;

    fn try_from(e: ChatMessageEntity) -> Result<Self> {
        let role = ChatRole::parse(&e.role).ok_or_else(|| {
            AppError::DatabaseError(format!("Unknown chat role: {}", e.role))
        })?;

        Ok(Self {
            id: e.id,
            role,
            content: e.content,
            timestamp: e.timestamp,
            dataset_id: e.dataset_id,
        })
    }
}
