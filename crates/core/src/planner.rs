use crate::models::{Destination, DevotionalIntent};

/// Reply used when the destination store has no rows at all.
const EMPTY_STORE_REPLY: &str = "I could not find temples in the current database yet, \
but I can still help you plan your yatra once temples are added.";

/// Return the single next clarifying question for the missing intent
/// fields, by fixed priority: deity, then location, then preference.
pub fn follow_up_question(intent: &DevotionalIntent) -> &'static str {
    if intent.deity.is_none() {
        return "Which deity would you like to center your yatra around?";
    }
    if intent.location.is_none() {
        return "Do you have a preferred city or state for this pilgrimage?";
    }
    if intent.travel_preference.is_none() {
        return "Do you prefer a family-friendly, budget, or peaceful pilgrimage experience?";
    }
    "Would you like me to suggest an itinerary and nearby temples as your next step?"
}

/// Compose the devotional reply text from the detected intent and the
/// already-sorted destination suggestions. Deterministic template filling.
pub fn compose_reply(intent: &DevotionalIntent, destinations: &[Destination]) -> String {
    if destinations.is_empty() {
        return EMPTY_STORE_REPLY.to_string();
    }

    let opening = match intent.deity {
        Some(deity) => format!(
            "Blessings! I found options aligned with your devotion to {}. ",
            deity.canonical_name()
        ),
        None => "Jai Shri Ram! ".to_string(),
    };

    let location_context = match &intent.location {
        Some(location) => format!("These are relevant for {location}. "),
        None => String::new(),
    };

    let preference_context = match intent.travel_preference {
        Some(preference) => format!(
            "I also noted your {} travel preference. ",
            preference.as_str()
        ),
        None => String::new(),
    };

    let top_names = destinations
        .iter()
        .take(3)
        .map(|destination| destination.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!("{opening}{location_context}{preference_context}Top suggestions include: {top_names}.")
}
