use anyhow::{Context, Result, anyhow};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{PlayerId, Position};
use crate::http_client::http_client;
use crate::squad::{SQUAD_SIZE, Squad};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingRequest {
    pub players: Vec<PlayerId>,
    pub captain: PlayerId,
    #[serde(rename = "viceCaptain")]
    pub vice_captain: PlayerId,
}

impl RatingRequest {
    /// `None` unless the squad passes [`Squad::is_submittable`].
    pub fn from_squad(squad: &Squad) -> Option<Self> {
        if !squad.is_submittable() {
            return None;
        }
        Some(Self {
            players: squad.member_ids(),
            captain: squad.captain()?,
            vice_captain: squad.vice_captain()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatingOutcome {
    #[serde(alias = "team_rating")]
    pub rating: f32,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("squad is not ready: need 11 players, a captain and a different vice-captain")]
    NotSubmittable,
    #[error("{0}")]
    Service(String),
}

pub trait RatingService {
    fn rate(&self, request: &RatingRequest) -> Result<RatingOutcome>;
}

/// The single path from a squad to the rating service. Nothing is sent unless the squad is
/// submittable; a failed call is reported with the service's own message.
pub fn submit_squad(
    squad: &Squad,
    service: &dyn RatingService,
) -> std::result::Result<RatingOutcome, SubmitError> {
    let request = RatingRequest::from_squad(squad).ok_or(SubmitError::NotSubmittable)?;
    tracing::info!(players = request.players.len(), "submitting squad for rating");
    service
        .rate(&request)
        .map_err(|err| SubmitError::Service(format!("{err:#}")))
}

#[derive(Serialize)]
struct RatingEnvelope<'a> {
    team: &'a RatingRequest,
}

pub struct HttpRatingService {
    base_url: String,
}

impl HttpRatingService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/team_rating", self.base_url)
    }
}

impl RatingService for HttpRatingService {
    fn rate(&self, request: &RatingRequest) -> Result<RatingOutcome> {
        let client = http_client()?;
        let resp = client
            .post(self.endpoint())
            .header(CONTENT_TYPE, "application/json")
            .json(&RatingEnvelope { team: request })
            .send()
            .context("rating request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading rating body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, body));
        }
        parse_rating_json(&body)
    }
}

pub fn parse_rating_json(raw: &str) -> Result<RatingOutcome> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty rating response"));
    }
    let value: serde_json::Value = serde_json::from_str(trimmed).context("invalid rating json")?;
    if let Some(err) = value.get("error").and_then(|v| v.as_str()) {
        return Err(anyhow!("{err}"));
    }
    serde_json::from_value(value).context("rating response has no rating")
}

/// Deterministic stand-in used when no backend is configured. Scores points and form of the
/// starters, doubles the captain, and lists the obvious gaps.
pub struct OfflineRatingService {
    catalog: Vec<crate::catalog::Player>,
}

impl OfflineRatingService {
    pub fn new(catalog: Vec<crate::catalog::Player>) -> Self {
        Self { catalog }
    }
}

impl RatingService for OfflineRatingService {
    fn rate(&self, request: &RatingRequest) -> Result<RatingOutcome> {
        if request.players.len() != SQUAD_SIZE {
            return Err(anyhow!(
                "expected {SQUAD_SIZE} players, got {}",
                request.players.len()
            ));
        }
        let mut players = Vec::with_capacity(SQUAD_SIZE);
        for id in &request.players {
            let player = self
                .catalog
                .iter()
                .find(|p| p.id == *id)
                .ok_or_else(|| anyhow!("unknown player id {id}"))?;
            players.push(player);
        }

        let mut raw = 0.0_f32;
        for player in &players {
            let weight = if player.id == request.captain { 2.0 } else { 1.0 };
            raw += weight * (player.stats.total_points as f32 / 10.0 + player.stats.form);
        }
        let rating = (raw / 1.6).clamp(0.0, 100.0).round();

        let mut weaknesses = Vec::new();
        for position in [Position::DEF, Position::MID, Position::FWD] {
            let count = players.iter().filter(|p| p.position == position).count();
            if count < 2 {
                weaknesses.push(format!("Thin at {}: only {count}", position.plural_label()));
            }
        }
        if let Some(captain) = players.iter().find(|p| p.id == request.captain) {
            if captain.stats.form < 4.0 {
                weaknesses.push(format!("Captain {} is out of form", captain.name));
            }
        }
        let doubtful = players.iter().filter(|p| !p.is_available()).count();
        if doubtful > 0 {
            weaknesses.push(format!("{doubtful} starter(s) flagged injured or doubtful"));
        }

        Ok(RatingOutcome { rating, weaknesses })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_vice_captain_camel_case() {
        let req = RatingRequest {
            players: vec![1, 2],
            captain: 1,
            vice_captain: 2,
        };
        let json = serde_json::to_value(RatingEnvelope { team: &req }).unwrap();
        assert_eq!(json["team"]["viceCaptain"], 2);
        assert_eq!(json["team"]["players"][1], 2);
    }

    #[test]
    fn rating_accepts_team_rating_alias() {
        let out = parse_rating_json(r#"{"team_rating": 71.5}"#).unwrap();
        assert_eq!(out.rating, 71.5);
        assert!(out.weaknesses.is_empty());
    }

    #[test]
    fn rating_error_payload_is_verbatim() {
        let err = parse_rating_json(r#"{"error": "model offline"}"#).unwrap_err();
        assert_eq!(err.to_string(), "model offline");
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let svc = HttpRatingService::new("http://localhost:8000/");
        assert_eq!(svc.endpoint(), "http://localhost:8000/team_rating");
    }
}
