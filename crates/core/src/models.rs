use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical deities the extractor can recognize. Declaration order is the
/// tie-break order when a message mentions more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Deity {
    Shiva,
    Vishnu,
    Krishna,
    Rama,
    Hanuman,
    Durga,
    Lakshmi,
    Ganesha,
    Murugan,
    Ayyappa,
}

impl Deity {
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::Shiva => "Shiva",
            Self::Vishnu => "Vishnu",
            Self::Krishna => "Krishna",
            Self::Rama => "Rama",
            Self::Hanuman => "Hanuman",
            Self::Durga => "Durga",
            Self::Lakshmi => "Lakshmi",
            Self::Ganesha => "Ganesha",
            Self::Murugan => "Murugan",
            Self::Ayyappa => "Ayyappa",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TravelPreference {
    Family,
    SeniorFriendly,
    Budget,
    Festive,
    Quiet,
}

impl TravelPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Family => "family",
            Self::SeniorFriendly => "senior-friendly",
            Self::Budget => "budget",
            Self::Festive => "festive",
            Self::Quiet => "quiet",
        }
    }
}

/// Structured devotional intent extracted from a single user message.
/// A fresh value per message; fields that fail to resolve stay unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevotionalIntent {
    pub deity: Option<Deity>,
    pub location: Option<String>,
    pub travel_preference: Option<TravelPreference>,
}

/// A pilgrimage site record. Owned by the destination store; the chat
/// pipeline only ever reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub deity: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDestination {
    pub name: String,
    pub city: String,
    pub state: String,
    pub deity: String,
    pub description: Option<String>,
}

/// Lightweight destination projection returned in chat replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedDestination {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub deity: String,
}

impl From<&Destination> for SuggestedDestination {
    fn from(destination: &Destination) -> Self {
        Self {
            id: destination.id,
            name: destination.name.clone(),
            city: destination.city.clone(),
            state: destination.state.clone(),
            deity: destination.deity.clone(),
        }
    }
}

/// One chat exchange, ready to append to the audit log. The store stamps
/// `created_at` when the row is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConversationTurn {
    pub user_message: String,
    pub ai_reply: String,
    pub detected_deity: Option<String>,
    pub detected_location: Option<String>,
    pub travel_preference: Option<String>,
}

/// Persisted audit row. Append-only; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: i64,
    pub user_message: String,
    pub ai_reply: String,
    pub detected_deity: Option<String>,
    pub detected_location: Option<String>,
    pub travel_preference: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub suggested_destinations: Vec<SuggestedDestination>,
    pub next_question: String,
}
