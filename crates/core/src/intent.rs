use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Deity, DevotionalIntent, TravelPreference};

/// Alias vocabulary for deity detection. First entry whose alias appears in
/// the lowercased message wins, so order doubles as priority.
const DEITY_ALIASES: &[(Deity, &[&str])] = &[
    (Deity::Shiva, &["shiva", "mahadev", "shankar", "bholenath"]),
    (Deity::Vishnu, &["vishnu", "narayana", "hari"]),
    (Deity::Krishna, &["krishna", "govinda", "kanha"]),
    (Deity::Rama, &["rama", "ram"]),
    (Deity::Hanuman, &["hanuman", "anjaneya", "bajrang"]),
    (Deity::Durga, &["durga", "maa durga", "amman"]),
    (Deity::Lakshmi, &["lakshmi", "mahalakshmi"]),
    (Deity::Ganesha, &["ganesha", "ganpati", "vinayaka"]),
    (Deity::Murugan, &["murugan", "kartikeya", "subramanya"]),
    (Deity::Ayyappa, &["ayyappa", "sabarimala"]),
];

const TRAVEL_PREFERENCE_KEYWORDS: &[(TravelPreference, &[&str])] = &[
    (TravelPreference::Family, &["family", "kids", "parents"]),
    (
        TravelPreference::SeniorFriendly,
        &["senior", "elderly", "easy", "comfortable"],
    ),
    (
        TravelPreference::Budget,
        &["budget", "cheap", "affordable", "low cost"],
    ),
    (
        TravelPreference::Festive,
        &["festival", "utsav", "celebration"],
    ),
    (
        TravelPreference::Quiet,
        &["quiet", "peaceful", "calm", "meditation"],
    ),
];

// Patterns like "in Varanasi" / "near Madurai"; the cue word matches
// case-insensitively, the capture is the longest run of letters and spaces.
static LOCATION_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:in|near|around|from|at)\s+([a-zA-Z\s]+)").expect("valid location cue regex")
});

// Fallback for users not using prepositions: runs of capitalized words.
static CAPITALIZED_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b").expect("valid capitalized phrase regex")
});

/// Detect deity, location and travel preference from a user message.
/// Fields the vocabulary does not cover stay unset; that is expected
/// degradation, not a failure.
pub fn extract_intent(message: &str) -> DevotionalIntent {
    let normalized = message.to_lowercase();

    let deity = DEITY_ALIASES
        .iter()
        .find(|(_, aliases)| contains_any(&normalized, aliases))
        .map(|(deity, _)| *deity);

    let travel_preference = TRAVEL_PREFERENCE_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(&normalized, keywords))
        .map(|(preference, _)| *preference);

    DevotionalIntent {
        deity,
        location: extract_location(message),
        travel_preference,
    }
}

/// Extract a probable location phrase from the original-cased message.
fn extract_location(message: &str) -> Option<String> {
    if let Some(captures) = LOCATION_CUE.captures(message) {
        return Some(title_case(captures[1].trim()));
    }

    CAPITALIZED_PHRASE
        .find_iter(message)
        .last()
        .map(|phrase| phrase.as_str().trim().to_string())
}

fn title_case(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deity_alias_sets_only_deity() {
        let intent = extract_intent("tell me about mahadev");
        assert_eq!(intent.deity, Some(Deity::Shiva));
        assert_eq!(intent.location, None);
        assert_eq!(intent.travel_preference, None);
    }

    #[test]
    fn first_deity_in_table_wins_regardless_of_text_position() {
        // Ayyappa appears first in the text, Shiva first in the table.
        let intent = extract_intent("ayyappa and shiva darshan");
        assert_eq!(intent.deity, Some(Deity::Shiva));

        let intent = extract_intent("vishnu or krishna, either works");
        assert_eq!(intent.deity, Some(Deity::Vishnu));
    }

    #[test]
    fn preference_keywords_resolve_by_table_order() {
        let intent = extract_intent("a cheap and peaceful trip");
        assert_eq!(intent.travel_preference, Some(TravelPreference::Budget));

        let intent = extract_intent("traveling with kids");
        assert_eq!(intent.travel_preference, Some(TravelPreference::Family));
    }

    #[test]
    fn location_from_preposition_cue_is_title_cased() {
        let intent = extract_intent("any temples near madurai");
        assert_eq!(intent.location.as_deref(), Some("Madurai"));
    }

    #[test]
    fn cue_capture_is_greedy_over_letters_and_spaces() {
        let intent = extract_intent("I want to visit a Shiva temple near Varanasi with my family");
        assert_eq!(intent.deity, Some(Deity::Shiva));
        assert_eq!(intent.travel_preference, Some(TravelPreference::Family));
        assert_eq!(intent.location.as_deref(), Some("Varanasi With My Family"));
    }

    #[test]
    fn cue_word_matches_case_insensitively() {
        let intent = extract_intent("Near rameswaram please");
        assert_eq!(intent.location.as_deref(), Some("Rameswaram Please"));
    }

    #[test]
    fn last_capitalized_phrase_wins_without_cue() {
        let intent = extract_intent("Kedarnath first, then maybe Badrinath");
        assert_eq!(intent.location.as_deref(), Some("Badrinath"));
    }

    #[test]
    fn consecutive_capitalized_words_form_one_phrase() {
        let intent = extract_intent("thinking about Tamil Nadu");
        assert_eq!(intent.location.as_deref(), Some("Tamil Nadu"));
    }

    #[test]
    fn lone_capitalized_word_is_treated_as_a_location_candidate() {
        // The no-preposition fallback has no notion of greetings; any
        // capitalized word qualifies.
        let intent = extract_intent("Hello");
        assert_eq!(intent.location.as_deref(), Some("Hello"));
        assert_eq!(intent.deity, None);
        assert_eq!(intent.travel_preference, None);
    }

    #[test]
    fn empty_message_leaves_every_field_unset() {
        assert_eq!(extract_intent(""), DevotionalIntent::default());
    }

    #[test]
    fn unknown_vocabulary_stays_unset() {
        let intent = extract_intent("hello there, what can you do?");
        assert_eq!(intent.deity, None);
        assert_eq!(intent.location, None);
        assert_eq!(intent.travel_preference, None);
    }
}
