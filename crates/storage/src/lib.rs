use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sqlx::{Row, SqlitePool};
use yatra_core::{ConversationTurn, Destination, NewConversationTurn, NewDestination};

/// Suggestion queries are capped so a chat reply never carries more than
/// five destinations.
pub const SUGGESTION_LIMIT: usize = 5;

pub trait DestinationRepository: Send + Sync {
    /// Case-insensitive substring filters: `deity_contains` against the
    /// deity column, `location_contains` against city OR state. Unset
    /// filters are not applied, so `(None, None)` is the default listing.
    /// Results are ordered by name ascending and capped at
    /// [`SUGGESTION_LIMIT`].
    async fn find_destinations(
        &self,
        deity_contains: Option<&str>,
        location_contains: Option<&str>,
    ) -> Result<Vec<Destination>>;

    async fn list_destinations(&self) -> Result<Vec<Destination>>;
    async fn get_destination(&self, id: i64) -> Result<Option<Destination>>;
    async fn insert_destination(&self, destination: NewDestination) -> Result<Destination>;
}

pub trait HistoryRepository: Send + Sync {
    /// Append one chat exchange to the audit log. The store stamps
    /// `created_at`; rows are never updated or deleted.
    async fn append_turn(&self, turn: NewConversationTurn) -> Result<ConversationTurn>;

    async fn recent_turns(&self, limit: i64) -> Result<Vec<ConversationTurn>>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    destinations: Arc<RwLock<Vec<Destination>>>,
    turns: Arc<RwLock<Vec<ConversationTurn>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DestinationRepository for MemoryStore {
    async fn find_destinations(
        &self,
        deity_contains: Option<&str>,
        location_contains: Option<&str>,
    ) -> Result<Vec<Destination>> {
        let deity_needle = deity_contains.map(str::to_lowercase);
        let location_needle = location_contains.map(str::to_lowercase);

        let mut matches: Vec<Destination> = self
            .destinations
            .read()
            .iter()
            .filter(|destination| {
                deity_needle
                    .as_deref()
                    .map_or(true, |needle| destination.deity.to_lowercase().contains(needle))
            })
            .filter(|destination| {
                location_needle.as_deref().map_or(true, |needle| {
                    destination.city.to_lowercase().contains(needle)
                        || destination.state.to_lowercase().contains(needle)
                })
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches.truncate(SUGGESTION_LIMIT);
        Ok(matches)
    }

    async fn list_destinations(&self) -> Result<Vec<Destination>> {
        let mut destinations: Vec<Destination> = self.destinations.read().clone();
        destinations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(destinations)
    }

    async fn get_destination(&self, id: i64) -> Result<Option<Destination>> {
        Ok(self
            .destinations
            .read()
            .iter()
            .find(|destination| destination.id == id)
            .cloned())
    }

    async fn insert_destination(&self, destination: NewDestination) -> Result<Destination> {
        let mut guard = self.destinations.write();
        let stored = Destination {
            id: guard.len() as i64 + 1,
            name: destination.name,
            city: destination.city,
            state: destination.state,
            deity: destination.deity,
            description: destination.description,
        };
        guard.push(stored.clone());
        Ok(stored)
    }
}

impl HistoryRepository for MemoryStore {
    async fn append_turn(&self, turn: NewConversationTurn) -> Result<ConversationTurn> {
        let mut guard = self.turns.write();
        let stored = ConversationTurn {
            id: guard.len() as i64 + 1,
            user_message: turn.user_message,
            ai_reply: turn.ai_reply,
            detected_deity: turn.detected_deity,
            detected_location: turn.detected_location,
            travel_preference: turn.travel_preference,
            created_at: Utc::now(),
        };
        guard.push(stored.clone());
        Ok(stored)
    }

    async fn recent_turns(&self, limit: i64) -> Result<Vec<ConversationTurn>> {
        let guard = self.turns.read();
        Ok(guard
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS destinations (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              name TEXT NOT NULL,
              city TEXT NOT NULL,
              state TEXT NOT NULL,
              deity TEXT NOT NULL,
              description TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_destinations_name ON destinations(name);")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_destinations_deity ON destinations(deity);")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_history (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              user_message TEXT NOT NULL,
              ai_reply TEXT NOT NULL,
              detected_deity TEXT,
              detected_location TEXT,
              travel_preference TEXT,
              created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_history_created_at ON chat_history(created_at);",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn destination_from_row(row: &sqlx::sqlite::SqliteRow) -> Destination {
    Destination {
        id: row.get("id"),
        name: row.get("name"),
        city: row.get("city"),
        state: row.get("state"),
        deity: row.get("deity"),
        description: row.get("description"),
    }
}

fn turn_from_row(row: &sqlx::sqlite::SqliteRow) -> ConversationTurn {
    ConversationTurn {
        id: row.get("id"),
        user_message: row.get("user_message"),
        ai_reply: row.get("ai_reply"),
        detected_deity: row.get("detected_deity"),
        detected_location: row.get("detected_location"),
        travel_preference: row.get("travel_preference"),
        created_at: row
            .get::<String, _>("created_at")
            .parse()
            .unwrap_or_else(|_| Utc::now()),
    }
}

impl DestinationRepository for SqliteStore {
    async fn find_destinations(
        &self,
        deity_contains: Option<&str>,
        location_contains: Option<&str>,
    ) -> Result<Vec<Destination>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, city, state, deity, description
            FROM destinations
            WHERE (?1 IS NULL OR lower(deity) LIKE '%' || lower(?1) || '%')
              AND (
                ?2 IS NULL
                OR lower(city) LIKE '%' || lower(?2) || '%'
                OR lower(state) LIKE '%' || lower(?2) || '%'
              )
            ORDER BY name ASC
            LIMIT ?3
            "#,
        )
        .bind(deity_contains)
        .bind(location_contains)
        .bind(SUGGESTION_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(destination_from_row).collect())
    }

    async fn list_destinations(&self) -> Result<Vec<Destination>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, city, state, deity, description
            FROM destinations
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(destination_from_row).collect())
    }

    async fn get_destination(&self, id: i64) -> Result<Option<Destination>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, city, state, deity, description
            FROM destinations
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(destination_from_row))
    }

    async fn insert_destination(&self, destination: NewDestination) -> Result<Destination> {
        let result = sqlx::query(
            r#"
            INSERT INTO destinations (name, city, state, deity, description)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&destination.name)
        .bind(&destination.city)
        .bind(&destination.state)
        .bind(&destination.deity)
        .bind(&destination.description)
        .execute(&self.pool)
        .await?;

        Ok(Destination {
            id: result.last_insert_rowid(),
            name: destination.name,
            city: destination.city,
            state: destination.state,
            deity: destination.deity,
            description: destination.description,
        })
    }
}

impl HistoryRepository for SqliteStore {
    async fn append_turn(&self, turn: NewConversationTurn) -> Result<ConversationTurn> {
        let created_at: DateTime<Utc> = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO chat_history
              (user_message, ai_reply, detected_deity, detected_location, travel_preference, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&turn.user_message)
        .bind(&turn.ai_reply)
        .bind(&turn.detected_deity)
        .bind(&turn.detected_location)
        .bind(&turn.travel_preference)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(ConversationTurn {
            id: result.last_insert_rowid(),
            user_message: turn.user_message,
            ai_reply: turn.ai_reply,
            detected_deity: turn.detected_deity,
            detected_location: turn.detected_location,
            travel_preference: turn.travel_preference,
            created_at,
        })
    }

    async fn recent_turns(&self, limit: i64) -> Result<Vec<ConversationTurn>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_message, ai_reply, detected_deity, detected_location,
                   travel_preference, created_at
            FROM chat_history
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(turn_from_row).collect())
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Memory(_) => "memory",
            Store::Sqlite(_) => "sqlite",
        }
    }
}

impl DestinationRepository for Store {
    async fn find_destinations(
        &self,
        deity_contains: Option<&str>,
        location_contains: Option<&str>,
    ) -> Result<Vec<Destination>> {
        match self {
            Store::Memory(store) => {
                store
                    .find_destinations(deity_contains, location_contains)
                    .await
            }
            Store::Sqlite(store) => {
                store
                    .find_destinations(deity_contains, location_contains)
                    .await
            }
        }
    }

    async fn list_destinations(&self) -> Result<Vec<Destination>> {
        match self {
            Store::Memory(store) => store.list_destinations().await,
            Store::Sqlite(store) => store.list_destinations().await,
        }
    }

    async fn get_destination(&self, id: i64) -> Result<Option<Destination>> {
        match self {
            Store::Memory(store) => store.get_destination(id).await,
            Store::Sqlite(store) => store.get_destination(id).await,
        }
    }

    async fn insert_destination(&self, destination: NewDestination) -> Result<Destination> {
        match self {
            Store::Memory(store) => store.insert_destination(destination).await,
            Store::Sqlite(store) => store.insert_destination(destination).await,
        }
    }
}

impl HistoryRepository for Store {
    async fn append_turn(&self, turn: NewConversationTurn) -> Result<ConversationTurn> {
        match self {
            Store::Memory(store) => store.append_turn(turn).await,
            Store::Sqlite(store) => store.append_turn(turn).await,
        }
    }

    async fn recent_turns(&self, limit: i64) -> Result<Vec<ConversationTurn>> {
        match self {
            Store::Memory(store) => store.recent_turns(limit).await,
            Store::Sqlite(store) => store.recent_turns(limit).await,
        }
    }
}
