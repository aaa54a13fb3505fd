use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, instrument};
use yatra_core::{
    compose_reply, extract_intent, follow_up_question, ChatReply, Deity, Destination,
    DevotionalIntent, NewConversationTurn, SuggestedDestination,
};
use yatra_observability::AppMetrics;
use yatra_storage::{DestinationRepository, HistoryRepository};

/// Failure categories surfaced to the transport layer. Intent fields that
/// fail to resolve are not errors; the pipeline proceeds with them unset.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Destination or history store could not be reached or queried. The
    /// turn is aborted; nothing partial is persisted or returned.
    #[error("store unavailable while processing chat turn")]
    Store(#[source] anyhow::Error),

    /// Any other fault during composition.
    #[error("unexpected failure while processing chat turn")]
    Internal(#[source] anyhow::Error),
}

/// Conversation orchestrator: one synchronous pipeline per message, with
/// exactly one destination read and one history write. No retries, no
/// state shared across invocations.
#[derive(Clone)]
pub struct YatraAgent<S>
where
    S: DestinationRepository + HistoryRepository,
{
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> YatraAgent<S>
where
    S: DestinationRepository + HistoryRepository,
{
    pub fn new(store: Arc<S>, metrics: Arc<AppMetrics>) -> Self {
        Self { store, metrics }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    #[instrument(skip(self, message))]
    pub async fn process_message(&self, message: &str) -> Result<ChatReply, ChatError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let intent = extract_intent(message);
        let destinations = self.find_relevant_destinations(&intent).await?;

        let reply = compose_reply(&intent, &destinations);
        let next_question = follow_up_question(&intent);

        self.store
            .append_turn(NewConversationTurn {
                user_message: message.to_string(),
                ai_reply: reply.clone(),
                detected_deity: intent.deity.map(|deity| deity.canonical_name().to_string()),
                detected_location: intent.location.clone(),
                travel_preference: intent
                    .travel_preference
                    .map(|preference| preference.as_str().to_string()),
            })
            .await
            .map_err(ChatError::Store)?;
        self.metrics.inc_turn_persisted();

        self.metrics.observe_latency(started.elapsed());
        info!(
            deity = ?intent.deity,
            location = ?intent.location,
            preference = ?intent.travel_preference,
            suggestions = destinations.len(),
            "chat turn handled"
        );

        Ok(ChatReply {
            reply,
            suggested_destinations: destinations.iter().map(SuggestedDestination::from).collect(),
            next_question: next_question.to_string(),
        })
    }

    /// Query destinations by the detected intent. If the filtered query
    /// comes back empty while at least one filter was applied, fall back
    /// to the unfiltered default listing so a non-empty store always
    /// yields suggestions.
    async fn find_relevant_destinations(
        &self,
        intent: &DevotionalIntent,
    ) -> Result<Vec<Destination>, ChatError> {
        let deity = intent.deity.map(Deity::canonical_name);
        let location = intent.location.as_deref();
        let filtered = deity.is_some() || location.is_some();

        let mut destinations = self
            .store
            .find_destinations(deity, location)
            .await
            .map_err(ChatError::Store)?;

        if destinations.is_empty() && filtered {
            self.metrics.inc_fallback_listing();
            destinations = self
                .store
                .find_destinations(None, None)
                .await
                .map_err(ChatError::Store)?;
        }

        Ok(destinations)
    }

    pub async fn recent_history(&self, limit: i64) -> Result<Vec<yatra_core::ConversationTurn>, ChatError> {
        self.store.recent_turns(limit).await.map_err(ChatError::Store)
    }
}
