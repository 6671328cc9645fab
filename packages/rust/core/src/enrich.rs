//! Fill pass: enrich records with missing fields from the external lookup.
//!
//! Selection, fetch, and merge are deliberately conservative: a record
//! qualifies only when `imageUrl` or `description` is empty, external
//! failures degrade to an empty fetch result, and the merge never overwrites
//! a value the record already holds. Records are processed one at a time in
//! store order with a fixed pause between lookups.

use tracing::{info, instrument, warn};

use meeplevault_shared::{FillConfig, Game, GameDetails, GameLookup, Result};
use meeplevault_store::GameStore;

/// Placeholder description for records the external source could not fill.
pub const FALLBACK_DESCRIPTION: &str = "No description yet — contributions welcome!";

/// Placeholder cover image for records the external source could not fill.
pub const FALLBACK_IMAGE_URL: &str = "https://meeplevault.github.io/assets/placeholder.jpg";

// ---------------------------------------------------------------------------
// FillResult
// ---------------------------------------------------------------------------

/// Summary of a completed fill pass.
#[derive(Debug, Clone, Default)]
pub struct FillResult {
    /// Records that qualified for enrichment (after any limit).
    pub candidates: usize,
    /// Records merged and rewritten.
    pub updated: usize,
    /// Candidates skipped for an empty title.
    pub skipped_missing_title: usize,
    /// Searches that returned no external id.
    pub search_misses: usize,
    /// Search or fetch calls that failed and were absorbed.
    pub lookup_errors: usize,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for the fill pass.
pub trait FillProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called per candidate record, before its lookup.
    fn record(&self, title: &str, current: usize, total: usize);
    /// Called when the pass completes.
    fn done(&self, result: &FillResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl FillProgress for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn record(&self, _title: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &FillResult) {}
}

// ---------------------------------------------------------------------------
// Merge policy
// ---------------------------------------------------------------------------

/// Fill empty record fields from a fetch result.
///
/// One-directional: a field is written only if the record's existing value
/// is missing (empty string or `None`). Existing truth always wins, so
/// applying the same fetch result twice is a no-op the second time. Empty
/// fetched values never count as "present" and are ignored.
pub fn merge_missing(game: &mut Game, fetched: &GameDetails) {
    if game.image_url.is_empty() && !fetched.image_url.is_empty() {
        game.image_url = fetched.image_url.clone();
    }
    if game.description.is_empty() && !fetched.description.is_empty() {
        game.description = fetched.description.clone();
    }
    if game.min_players.is_none() {
        game.min_players = fetched.min_players;
    }
    if game.max_players.is_none() {
        game.max_players = fetched.max_players;
    }
    if game.play_time.is_none() {
        game.play_time = fetched.play_time;
    }
}

/// Apply static fallbacks into a fetch result for whichever of the two text
/// fields is still empty, so every candidate record ends the pass with a
/// description and a cover.
pub fn apply_fallbacks(fetched: &mut GameDetails) {
    if fetched.description.is_empty() {
        fetched.description = FALLBACK_DESCRIPTION.into();
    }
    if fetched.image_url.is_empty() {
        fetched.image_url = FALLBACK_IMAGE_URL.into();
    }
}

// ---------------------------------------------------------------------------
// Fill pass
// ---------------------------------------------------------------------------

/// Run the fill pass over `store` using `lookup` as the external collaborator.
///
/// Per-record failures (missing title, search error, fetch error) are logged
/// and absorbed; the pass always runs the candidate list to completion.
#[instrument(skip_all, fields(store = %store.root().display()))]
pub async fn run_fill<L: GameLookup>(
    config: &FillConfig,
    lookup: &L,
    store: &GameStore,
    progress: &dyn FillProgress,
) -> Result<FillResult> {
    progress.phase("Scanning store for records with missing fields");

    let mut candidates: Vec<Game> = store
        .list()?
        .into_iter()
        .filter(Game::needs_enrichment)
        .collect();
    if let Some(limit) = config.limit {
        candidates.truncate(limit);
    }

    let mut result = FillResult {
        candidates: candidates.len(),
        ..Default::default()
    };

    info!(candidates = result.candidates, "starting fill pass");

    let total = candidates.len();
    for (i, mut game) in candidates.into_iter().enumerate() {
        progress.record(&game.title, i + 1, total);

        if game.title.is_empty() {
            warn!(id = %game.id, "record has no title, skipping");
            result.skipped_missing_title += 1;
            continue;
        }

        let mut fetched = match lookup.search(&game.title).await {
            Ok(Some(external_id)) => match lookup.fetch(&external_id).await {
                Ok(details) => details,
                Err(e) => {
                    warn!(id = %game.id, external_id = %external_id, error = %e, "detail fetch failed");
                    result.lookup_errors += 1;
                    GameDetails::default()
                }
            },
            Ok(None) => {
                result.search_misses += 1;
                GameDetails::default()
            }
            Err(e) => {
                warn!(id = %game.id, title = %game.title, error = %e, "search failed");
                result.lookup_errors += 1;
                GameDetails::default()
            }
        };

        // Always fall back, so the record is completed even on a dry lookup.
        apply_fallbacks(&mut fetched);
        merge_missing(&mut game, &fetched);
        store.write(&game)?;
        result.updated += 1;

        // Fixed pause between external lookups, per the collaborator's
        // usage policy.
        if !config.delay.is_zero() && i + 1 < total {
            tokio::time::sleep(config.delay).await;
        }
    }

    info!(
        candidates = result.candidates,
        updated = result.updated,
        skipped_missing_title = result.skipped_missing_title,
        search_misses = result.search_misses,
        lookup_errors = result.lookup_errors,
        "fill pass complete"
    );

    progress.done(&result);
    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
