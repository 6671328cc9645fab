//! Core domain types for the MeepleVault catalog.

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// One board game — the unit of storage and merge.
///
/// Serialized with camelCase keys to match the catalog JSON consumed by the
/// website. Absent numeric fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Unique key. Records without an id never enter the store.
    pub id: String,
    /// Display title; may be empty.
    pub title: String,
    /// Ordered category tags, split from the raw `,`/`/`-delimited column.
    #[serde(default)]
    pub categories: Vec<String>,
    pub min_players: Option<u32>,
    pub max_players: Option<u32>,
    /// Typical play time in minutes.
    pub play_time: Option<u32>,
    pub difficulty: Option<u32>,
    pub social_intensity: Option<u32>,
    pub learn_ease: Option<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    /// Related game ids. Initialized empty; reserved for a later pass.
    #[serde(default)]
    pub similar: Vec<String>,
}

impl Game {
    /// Create an otherwise-empty record with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            categories: Vec::new(),
            min_players: None,
            max_players: None,
            play_time: None,
            difficulty: None,
            social_intensity: None,
            learn_ease: None,
            description: String::new(),
            image_url: String::new(),
            similar: Vec::new(),
        }
    }

    /// Whether this record qualifies for the fill pass.
    ///
    /// A record is a candidate when either of the two user-facing text
    /// fields is empty; complete records are never re-fetched.
    pub fn needs_enrichment(&self) -> bool {
        self.image_url.is_empty() || self.description.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GameDetails
// ---------------------------------------------------------------------------

/// Partial field set returned by the detail-fetch collaborator.
///
/// Fields the page did not yield stay empty/`None` — an absent field is
/// never an error. `Default` is the empty fetch result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameDetails {
    pub image_url: String,
    pub description: String,
    pub min_players: Option<u32>,
    pub max_players: Option<u32>,
    pub play_time: Option<u32>,
}

// ---------------------------------------------------------------------------
// GameLookup
// ---------------------------------------------------------------------------

/// Capability interface for the external lookup-then-scrape collaborator.
///
/// `search` resolves a free-text title to at most one opaque external id
/// (first-match semantics, no ranking). `fetch` scrapes the detail page for
/// that id into a partial [`GameDetails`]. How either is implemented — page
/// structure, selectors, regexes — is the implementor's concern.
pub trait GameLookup {
    fn search(&self, title: &str) -> impl Future<Output = Result<Option<String>>> + Send;
    fn fetch(&self, external_id: &str) -> impl Future<Output = Result<GameDetails>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_game() -> Game {
        Game {
            id: "catan".into(),
            title: "Catan".into(),
            categories: vec!["Strategy".into(), "Family".into()],
            min_players: Some(3),
            max_players: Some(4),
            play_time: Some(90),
            difficulty: Some(3),
            social_intensity: None,
            learn_ease: Some(4),
            description: "Trade, build, settle.".into(),
            image_url: String::new(),
            similar: vec![],
        }
    }

    #[test]
    fn game_serializes_with_camel_case_keys() {
        let json = serde_json::to_string_pretty(&sample_game()).expect("serialize");
        assert!(json.contains("\"minPlayers\": 3"));
        assert!(json.contains("\"imageUrl\": \"\""));
        assert!(json.contains("\"socialIntensity\": null"));
        assert!(json.contains("\"learnEase\": 4"));
    }

    #[test]
    fn game_roundtrip() {
        let game = sample_game();
        let json = serde_json::to_string(&game).expect("serialize");
        let parsed: Game = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, game);
    }

    #[test]
    fn game_deserializes_missing_optional_keys() {
        // Hand-edited store files may drop empty collections.
        let json = r#"{
            "id": "g1", "title": "G1",
            "minPlayers": null, "maxPlayers": null, "playTime": null,
            "difficulty": null, "socialIntensity": null, "learnEase": null
        }"#;
        let parsed: Game = serde_json::from_str(json).expect("deserialize");
        assert!(parsed.categories.is_empty());
        assert!(parsed.similar.is_empty());
        assert!(parsed.description.is_empty());
    }

    #[test]
    fn needs_enrichment_when_either_text_field_empty() {
        let mut game = sample_game();
        assert!(game.needs_enrichment()); // image_url empty

        game.image_url = "https://example.com/catan.jpg".into();
        assert!(!game.needs_enrichment());

        game.description.clear();
        assert!(game.needs_enrichment());
    }

    #[test]
    fn non_ascii_preserved_unescaped() {
        let mut game = Game::new("go");
        game.title = "圍棋".into();
        let json = serde_json::to_string(&game).expect("serialize");
        assert!(json.contains("圍棋"));
        assert!(!json.contains("\\u"));
    }
}
