use anyhow::{Context, Result, anyhow};
use reqwest::header::ACCEPT;

use crate::catalog::{
    CaptainPick, Catalog, Injury, TransferSuggestion, parse_best_xi_json, parse_captain_json,
    parse_injuries_json, parse_players_json, parse_transfers_json,
};
use crate::http_client::http_client;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Read-only source of everything the screens display.
pub trait CatalogFeed: Send {
    fn label(&self) -> &'static str;
    fn players(&self) -> Result<Catalog>;
    fn best_xi(&self) -> Result<Catalog>;
    fn injuries(&self) -> Result<Vec<Injury>>;
    fn transfers(&self) -> Result<Vec<TransferSuggestion>>;
    fn captain(&self) -> Result<CaptainPick>;
}

pub struct ApiFeed {
    base_url: String,
}

impl ApiFeed {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_body(&self, path: &str) -> Result<String> {
        let client = http_client()?;
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let resp = client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .with_context(|| format!("request to {path} failed"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, body));
        }
        Ok(body)
    }
}

impl CatalogFeed for ApiFeed {
    fn label(&self) -> &'static str {
        "api"
    }

    fn players(&self) -> Result<Catalog> {
        parse_players_json(&self.get_body("/players")?)
    }

    fn best_xi(&self) -> Result<Catalog> {
        parse_best_xi_json(&self.get_body("/team_builder")?)
    }

    fn injuries(&self) -> Result<Vec<Injury>> {
        parse_injuries_json(&self.get_body("/injuries")?)
    }

    fn transfers(&self) -> Result<Vec<TransferSuggestion>> {
        parse_transfers_json(&self.get_body("/transfers")?)
    }

    fn captain(&self) -> Result<CaptainPick> {
        parse_captain_json(&self.get_body("/captain")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let feed = ApiFeed::new("http://127.0.0.1:8000/");
        assert_eq!(feed.url("/players"), "http://127.0.0.1:8000/players");
        assert_eq!(feed.url("captain"), "http://127.0.0.1:8000/captain");
    }
}
