//! Conversion pass: tabular source → canonical records.
//!
//! Reads the delimited source (tolerating an Excel-style UTF-8 BOM), coerces
//! each row into a [`Game`], writes one store file per record, and emits the
//! merged catalog artifact. Rows without an id are skipped silently; every
//! other malformation degrades to an empty/absent field.

use std::path::Path;

use tracing::{info, instrument, warn};

use meeplevault_shared::{Game, MeepleVaultError, Result};
use meeplevault_store::{GameStore, write_catalog};

/// Summary of a completed convert pass.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Records written to the store and catalog.
    pub written: usize,
    /// Rows dropped for an empty id.
    pub skipped_missing_id: usize,
}

/// Run the convert pass: read `source`, populate `store`, write the catalog
/// artifact at `catalog`.
#[instrument(skip_all, fields(source = %source.display()))]
pub fn run_convert(source: &Path, store: &GameStore, catalog: &Path) -> Result<ConvertResult> {
    let content =
        std::fs::read_to_string(source).map_err(|e| MeepleVaultError::io(source, e))?;
    let games = normalize_csv(&content)?;

    let mut written = 0usize;
    let mut skipped = 0usize;

    let mut kept: Vec<Game> = Vec::with_capacity(games.len());
    for game in games {
        match game {
            Some(game) => {
                store.write(&game)?;
                kept.push(game);
                written += 1;
            }
            None => skipped += 1,
        }
    }

    write_catalog(catalog, &kept)?;

    info!(written, skipped, catalog = %catalog.display(), "convert pass complete");

    Ok(ConvertResult {
        written,
        skipped_missing_id: skipped,
    })
}

/// Parse CSV content into per-row results: `Some(game)` for a usable row,
/// `None` for a row dropped over an empty id.
fn normalize_csv(content: &str) -> Result<Vec<Option<Game>>> {
    // Excel exports prepend a BOM; strip it before the reader sees it.
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| MeepleVaultError::parse(format!("unreadable header row: {e}")))?
        .clone();
    let columns = Columns::new(&headers);

    let mut games = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                // A row the reader cannot tokenize at all carries no fields.
                warn!(error = %e, "skipping unreadable row");
                games.push(None);
                continue;
            }
        };
        games.push(game_from_row(&columns, &record));
    }
    Ok(games)
}

/// Header-name → column-index mapping for the recognized columns.
struct Columns {
    id: Option<usize>,
    title: Option<usize>,
    categories: Option<usize>,
    min_players: Option<usize>,
    max_players: Option<usize>,
    play_time: Option<usize>,
    difficulty: Option<usize>,
    social_intensity: Option<usize>,
    learn_ease: Option<usize>,
    description: Option<usize>,
    image_url: Option<usize>,
}

impl Columns {
    fn new(headers: &csv::StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        Self {
            id: find("id"),
            title: find("title"),
            categories: find("categories"),
            min_players: find("minPlayers"),
            max_players: find("maxPlayers"),
            play_time: find("playTime"),
            difficulty: find("difficulty"),
            social_intensity: find("socialIntensity"),
            learn_ease: find("learnEase"),
            description: find("description"),
            image_url: find("imageUrl"),
        }
    }
}

/// Trimmed cell value, or `""` when the column or cell is missing.
fn cell<'a>(record: &'a csv::StringRecord, index: Option<usize>) -> &'a str {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .unwrap_or("")
}

/// Coerce one row into a [`Game`]; `None` when the id cell is empty.
fn game_from_row(columns: &Columns, record: &csv::StringRecord) -> Option<Game> {
    let id = cell(record, columns.id);
    if id.is_empty() {
        return None;
    }

    Some(Game {
        id: id.to_string(),
        title: cell(record, columns.title).to_string(),
        categories: parse_categories(cell(record, columns.categories)),
        min_players: parse_count(cell(record, columns.min_players)),
        max_players: parse_count(cell(record, columns.max_players)),
        play_time: parse_count(cell(record, columns.play_time)),
        difficulty: parse_count(cell(record, columns.difficulty)),
        social_intensity: parse_count(cell(record, columns.social_intensity)),
        learn_ease: parse_count(cell(record, columns.learn_ease)),
        description: cell(record, columns.description).to_string(),
        image_url: cell(record, columns.image_url).to_string(),
        similar: Vec::new(),
    })
}

/// Split the raw category column on both `,` and `/`, trimming tokens and
/// dropping empties. Order is preserved.
pub fn parse_categories(raw: &str) -> Vec<String> {
    raw.replace(',', "/")
        .split('/')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Digit-only integer coercion: a value parses iff the trimmed string is
/// non-empty and all ASCII digits. Anything else — ranges, signs, decimals,
/// blanks — yields absence, never an error.
pub fn parse_count(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}
