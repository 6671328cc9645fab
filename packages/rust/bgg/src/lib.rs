//! BoardGameGeek lookup collaborator.
//!
//! Implements [`GameLookup`] in two steps, mirroring how the site is meant
//! to be consumed politely:
//! - `search` hits the public XML API and takes the first matching game id
//!   (no ranking, no disambiguation)
//! - `fetch` scrapes the game's detail page for cover, description, player
//!   counts, and play time; whatever the page does not yield is omitted
//!
//! Rate limiting between calls is the caller's job (the fill pass sleeps
//! between records).

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use meeplevault_shared::{FillConfig, GameDetails, GameLookup, MeepleVaultError, Result};

/// XML API search endpoint.
const SEARCH_URL: &str = "https://api.geekdo.com/xmlapi2/search";

/// Game detail page base (trailing slash so ids join as path segments).
const GAME_PAGE_URL: &str = "https://boardgamegeek.com/boardgame/";

/// HTTP client for the BGG XML API and website.
pub struct BggClient {
    client: reqwest::Client,
    search_base: Url,
    page_base: Url,
}

impl BggClient {
    /// Build a client against the real BGG endpoints.
    pub fn new(config: &FillConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.timeout)
            .build()
            .map_err(|e| MeepleVaultError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            search_base: Url::parse(SEARCH_URL).expect("static URL"),
            page_base: Url::parse(GAME_PAGE_URL).expect("static URL"),
        })
    }

    /// Point the client at alternate endpoints (for mock-server tests).
    #[cfg(test)]
    fn with_bases(mut self, search_base: Url, page_base: Url) -> Self {
        self.search_base = search_base;
        self.page_base = page_base;
        self
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| MeepleVaultError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MeepleVaultError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| MeepleVaultError::Network(format!("{url}: body read failed: {e}")))
    }
}

impl GameLookup for BggClient {
    /// Search the XML API by title; first `id="…"` attribute wins.
    async fn search(&self, title: &str) -> Result<Option<String>> {
        let mut url = self.search_base.clone();
        url.query_pairs_mut()
            .append_pair("type", "boardgame")
            .append_pair("query", title);

        let body = self.get_text(url).await?;

        let id_re = Regex::new(r#"id="(\d+)""#).unwrap();
        let id = id_re
            .captures(&body)
            .map(|caps| caps[1].to_string());

        debug!(title, id = id.as_deref().unwrap_or("-"), "search result");
        Ok(id)
    }

    /// Scrape a detail page into a partial [`GameDetails`].
    async fn fetch(&self, external_id: &str) -> Result<GameDetails> {
        let url = self
            .page_base
            .join(external_id)
            .map_err(|e| MeepleVaultError::Network(format!("bad game id '{external_id}': {e}")))?;

        let html = self.get_text(url).await?;
        Ok(parse_game_page(&html))
    }
}

/// Extract cover, description, player counts, and play time from a detail
/// page. Anything the page does not yield stays empty/`None`.
fn parse_game_page(html: &str) -> GameDetails {
    let doc = Html::parse_document(html);

    let image_url = {
        let img_sel = Selector::parse("img[data-image]").unwrap();
        doc.select(&img_sel)
            .next()
            .and_then(|el| el.value().attr("src"))
            .unwrap_or("")
            .to_string()
    };

    let description = {
        let desc_sel = Selector::parse(".game-description").unwrap();
        doc.select(&desc_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    };

    // Player counts and play time live in loose page text, not stable markup.
    let text = doc
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let (min_players, max_players) = {
        let players_re = Regex::new(r"Players\s+(\d+)[^\d]+(\d+)").unwrap();
        match players_re.captures(&text) {
            Some(caps) => (caps[1].parse().ok(), caps[2].parse().ok()),
            None => (None, None),
        }
    };

    let play_time = {
        let time_re = Regex::new(r"Playing Time\s+(\d+)").unwrap();
        time_re
            .captures(&text)
            .and_then(|caps| caps[1].parse().ok())
    };

    GameDetails {
        image_url,
        description,
        min_players,
        max_players,
        play_time,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> FillConfig {
        FillConfig {
            timeout: Duration::from_secs(2),
            delay: Duration::ZERO,
            user_agent: "MeepleVaultBot/test".into(),
            limit: None,
        }
    }

    async fn client_for(server: &MockServer) -> BggClient {
        let base = Url::parse(&server.uri()).unwrap();
        BggClient::new(&test_config())
            .unwrap()
            .with_bases(
                base.join("/xmlapi2/search").unwrap(),
                base.join("/boardgame/").unwrap(),
            )
    }

    const SEARCH_HIT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items total="2" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
    <item type="boardgame" id="13">
        <name type="primary" value="Catan"/>
        <yearpublished value="1995"/>
    </item>
    <item type="boardgame" id="27710">
        <name type="primary" value="Catan: Traveler"/>
    </item>
</items>"#;

    const SEARCH_MISS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items total="0" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse"></items>"#;

    const GAME_PAGE: &str = r#"<html><body>
        <div class="game-header">
            <img data-image="1" src="https://cf.geekdo-images.com/catan-cover.jpg" alt="cover"/>
            <h1>Catan</h1>
        </div>
        <ul class="gameplay">
            <li>Players 3 &ndash; 4</li>
            <li>Playing Time 90 Min</li>
        </ul>
        <article class="game-description">
            Trade, build, and settle the island of Catan.
        </article>
    </body></html>"#;

    #[tokio::test]
    async fn search_returns_first_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/xmlapi2/search"))
            .and(query_param("type", "boardgame"))
            .and(query_param("query", "Catan"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_HIT))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let id = client.search("Catan").await.unwrap();
        assert_eq!(id.as_deref(), Some("13"));
    }

    #[tokio::test]
    async fn search_without_match_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/xmlapi2/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_MISS))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let id = client.search("Totally Unknown Game").await.unwrap();
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn search_http_error_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/xmlapi2/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.search("Catan").await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn fetch_parses_a_full_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/boardgame/13"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GAME_PAGE))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let details = client.fetch("13").await.unwrap();

        assert_eq!(
            details.image_url,
            "https://cf.geekdo-images.com/catan-cover.jpg"
        );
        assert_eq!(
            details.description,
            "Trade, build, and settle the island of Catan."
        );
        assert_eq!(details.min_players, Some(3));
        assert_eq!(details.max_players, Some(4));
        assert_eq!(details.play_time, Some(90));
    }

    #[tokio::test]
    async fn fetch_omits_fields_the_page_lacks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/boardgame/99"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><h1>Bare page</h1></body></html>"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let details = client.fetch("99").await.unwrap();
        assert_eq!(details, GameDetails::default());
    }

    #[tokio::test]
    async fn fetch_http_error_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/boardgame/13"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.fetch("13").await.is_err());
    }

    #[test]
    fn page_parser_handles_spread_out_text() {
        // Player range split across inline elements still matches on the
        // flattened page text.
        let html = r#"<html><body>
            <span>Players</span> <b>2</b> <span>&mdash;</span> <b>6</b>
            <span>Playing Time</span> <b>30</b>
        </body></html>"#;
        let details = parse_game_page(html);
        assert_eq!(details.min_players, Some(2));
        assert_eq!(details.max_players, Some(6));
        assert_eq!(details.play_time, Some(30));
        assert!(details.image_url.is_empty());
    }
}
