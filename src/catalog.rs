use std::collections::HashSet;
use std::fmt;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type PlayerId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Position {
    GK,
    DEF,
    MID,
    FWD,
}

impl Position {
    pub const ALL: [Position; 4] = [Position::GK, Position::DEF, Position::MID, Position::FWD];

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "GK" | "GKP" | "G" => Some(Position::GK),
            "DEF" | "D" => Some(Position::DEF),
            "MID" | "M" => Some(Position::MID),
            "FWD" | "F" => Some(Position::FWD),
            _ => None,
        }
    }

    // FPL `element_type`: 1 GKP, 2 DEF, 3 MID, 4 FWD.
    pub fn from_element_type(kind: u64) -> Option<Self> {
        match kind {
            1 => Some(Position::GK),
            2 => Some(Position::DEF),
            3 => Some(Position::MID),
            4 => Some(Position::FWD),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Position::GK => "GK",
            Position::DEF => "DEF",
            Position::MID => "MID",
            Position::FWD => "FWD",
        }
    }

    pub fn plural_label(self) -> &'static str {
        match self {
            Position::GK => "Goalkeepers",
            Position::DEF => "Defenders",
            Position::MID => "Midfielders",
            Position::FWD => "Forwards",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Position::GK => 0,
            Position::DEF => 1,
            Position::MID => 2,
            Position::FWD => 3,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Display-only numbers carried alongside a player. The squad rules never look at these.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerStats {
    pub total_points: i32,
    pub form: f32,
    pub selected_by_percent: f32,
    pub minutes: u32,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub next_opponent: Option<String>,
    pub status: Option<String>,
    pub chance_of_playing: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Club identity used for the per-club quota.
    pub club: String,
    pub club_id: Option<u32>,
    pub position: Position,
    /// Price in tenths of a currency unit (55 == 5.5).
    pub price_tenths: u32,
    pub stats: PlayerStats,
}

impl Player {
    pub fn price(&self) -> f32 {
        self.price_tenths as f32 / 10.0
    }

    pub fn is_available(&self) -> bool {
        matches!(self.stats.status.as_deref(), None | Some("a") | Some(""))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Injury {
    pub player: String,
    pub club_id: Option<u32>,
    pub club: Option<String>,
    pub status: String,
    pub news: Option<String>,
    pub chance_of_playing: Option<u8>,
}

impl Injury {
    pub fn status_label(&self) -> &'static str {
        status_label(&self.status)
    }

    /// Lower is worse; used to sort the injury table.
    pub fn severity_rank(&self) -> u8 {
        match self.status.trim().to_ascii_lowercase().as_str() {
            "i" | "injured" | "out" => 0,
            "s" | "suspended" => 1,
            "n" | "unavailable" => 2,
            "d" | "doubtful" => 3,
            "questionable" => 4,
            _ => 5,
        }
    }
}

pub fn status_label(code: &str) -> &'static str {
    match code.trim().to_ascii_lowercase().as_str() {
        "a" => "Available",
        "d" | "doubtful" => "Doubtful",
        "i" | "injured" | "out" => "Injured",
        "s" | "suspended" => "Suspended",
        "n" | "unavailable" => "Unavailable",
        "u" => "Left club",
        "questionable" => "Questionable",
        _ => "Unknown",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferSuggestion {
    pub name: String,
    pub predicted_points: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptainPick {
    pub name: String,
    pub predicted_points: f32,
    pub next_opponent: Option<String>,
    pub opponent_defense: Option<f32>,
}

/// What the boundary dropped while turning a feed body into players.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogReport {
    pub accepted: usize,
    pub missing_id: usize,
    pub bad_position: usize,
    pub bad_price: usize,
    pub duplicate_id: usize,
}

impl CatalogReport {
    pub fn rejected(&self) -> usize {
        self.missing_id + self.bad_position + self.bad_price + self.duplicate_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub players: Vec<Player>,
    pub report: CatalogReport,
}

pub fn parse_players_json(raw: &str) -> Result<Catalog> {
    let Some(root) = parse_root(raw, "invalid players json")? else {
        return Ok(Catalog::default());
    };
    let items = match &root {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => match root.get("players").or_else(|| root.get("elements")) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => return Err(anyhow!("players payload is not a list")),
        },
        _ => return Err(anyhow!("players payload is not a list")),
    };
    Ok(players_from_values(items))
}

pub fn parse_best_xi_json(raw: &str) -> Result<Catalog> {
    let Some(root) = parse_root(raw, "invalid team_builder json")? else {
        return Ok(Catalog::default());
    };
    match root.get("best_xi") {
        Some(Value::Array(items)) => Ok(players_from_values(items)),
        Some(Value::Null) | None => Ok(Catalog::default()),
        Some(_) => Err(anyhow!("best_xi is not a list")),
    }
}

pub fn parse_injuries_json(raw: &str) -> Result<Vec<Injury>> {
    let Some(root) = parse_root(raw, "invalid injuries json")? else {
        return Ok(Vec::new());
    };
    let items = match &root {
        Value::Array(items) => items.as_slice(),
        _ => match root.get("injuries") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => return Ok(Vec::new()),
        },
    };

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let player = pick_string(item, &["player", "player_name", "name"]).or_else(|| {
            let first = pick_string(item, &["first_name"])?;
            let second = pick_string(item, &["second_name"])?;
            Some(format!("{first} {second}"))
        });
        let Some(player) = player.and_then(|p| non_empty(&p).map(str::to_string)) else {
            continue;
        };
        let club_id = pick_u32(item, &["team", "team_id"]);
        let club = item
            .get("team")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| pick_string(item, &["team_name"]));
        out.push(Injury {
            player,
            club_id,
            club,
            status: pick_string(item, &["status"]).unwrap_or_default(),
            news: pick_string(item, &["news"]).and_then(|n| non_empty(&n).map(str::to_string)),
            chance_of_playing: pick_u32(
                item,
                &["chance_of_playing", "chance_of_playing_next_round"],
            )
            .map(|v| v.min(100) as u8),
        });
    }
    Ok(out)
}

pub fn parse_transfers_json(raw: &str) -> Result<Vec<TransferSuggestion>> {
    let Some(root) = parse_root(raw, "invalid transfers json")? else {
        return Ok(Vec::new());
    };
    let items = match &root {
        Value::Array(items) => items.as_slice(),
        _ => match root.get("suggestions") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => return Ok(Vec::new()),
        },
    };

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        // Suggestions may wrap the player: `{ "player": { "name": .. }, "direction": .. }`.
        let source = item.get("player").filter(|v| v.is_object()).unwrap_or(item);
        let Some(name) = pick_string(source, &["name", "web_name", "player"]) else {
            continue;
        };
        let predicted_points = pick_f32(item, &["predicted_points"])
            .or_else(|| pick_f32(source, &["predicted_points", "form"]))
            .unwrap_or(0.0);
        out.push(TransferSuggestion {
            name,
            predicted_points,
        });
    }
    Ok(out)
}

pub fn parse_captain_json(raw: &str) -> Result<CaptainPick> {
    let root = parse_root(raw, "invalid captain json")?
        .ok_or_else(|| anyhow!("empty captain response"))?;
    let name = pick_string(&root, &["captain", "name"])
        .ok_or_else(|| anyhow!("captain response has no player name"))?;
    Ok(CaptainPick {
        name,
        predicted_points: pick_f32(&root, &["predicted_points"]).unwrap_or(0.0),
        next_opponent: pick_string(&root, &["next_opponent", "team_a"]),
        opponent_defense: pick_f32(&root, &["opponent_defensive_strength", "opponent_defense"]),
    })
}

fn parse_root(raw: &str, what: &'static str) -> Result<Option<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let root: Value = serde_json::from_str(trimmed).context(what)?;
    if let Some(err) = root.get("error").and_then(Value::as_str) {
        return Err(anyhow!("backend error: {err}"));
    }
    Ok(Some(root))
}

fn players_from_values(items: &[Value]) -> Catalog {
    let mut report = CatalogReport::default();
    let mut seen = HashSet::with_capacity(items.len());
    let mut players = Vec::with_capacity(items.len());

    for item in items {
        match player_from_value(item) {
            Ok(player) => {
                if !seen.insert(player.id) {
                    report.duplicate_id += 1;
                    continue;
                }
                players.push(player);
            }
            Err(Reject::MissingId) => report.missing_id += 1,
            Err(Reject::Position) => report.bad_position += 1,
            Err(Reject::Price) => report.bad_price += 1,
        }
    }

    report.accepted = players.len();
    Catalog { players, report }
}

enum Reject {
    MissingId,
    Position,
    Price,
}

fn player_from_value(item: &Value) -> std::result::Result<Player, Reject> {
    let id = pick_u32(item, &["id", "player_id"]).ok_or(Reject::MissingId)?;

    let position = match item.get("position") {
        Some(Value::String(code)) => Position::from_code(code),
        Some(Value::Number(n)) => n.as_u64().and_then(Position::from_element_type),
        _ => item
            .get("element_type")
            .and_then(Value::as_u64)
            .and_then(Position::from_element_type),
    }
    .ok_or(Reject::Position)?;

    let price_tenths = pick_price_tenths(item, &["value", "now_cost", "price"]).ok_or(Reject::Price)?;

    let name = pick_string(item, &["name", "web_name"])
        .or_else(|| {
            let first = pick_string(item, &["first_name"])?;
            let second = pick_string(item, &["second_name"])?;
            Some(format!("{first} {second}"))
        })
        .unwrap_or_else(|| format!("Player {id}"));

    let club_id = pick_u32(item, &["team_id", "team"]);
    let club = pick_string(item, &["team_name", "club"])
        .and_then(|c| non_empty(&c).map(str::to_string))
        .or_else(|| club_id.map(|id| id.to_string()))
        .unwrap_or_else(|| "unknown".to_string());

    let stats = PlayerStats {
        total_points: pick_f32(item, &["total_points"]).map(|v| v.round() as i32).unwrap_or(0),
        form: pick_f32(item, &["form"]).unwrap_or(0.0),
        selected_by_percent: pick_f32(item, &["selected_by_percent"]).unwrap_or(0.0),
        minutes: pick_u32(item, &["minutes"]).unwrap_or(0),
        goals_scored: pick_u32(item, &["goals_scored"]).unwrap_or(0),
        assists: pick_u32(item, &["assists"]).unwrap_or(0),
        clean_sheets: pick_u32(item, &["clean_sheets"]).unwrap_or(0),
        next_opponent: pick_string(item, &["next_opponent"]),
        status: pick_string(item, &["status"]),
        chance_of_playing: pick_u32(item, &["chance_of_playing", "chance_of_playing_next_round"])
            .map(|v| v.min(100) as u8),
    };

    Ok(Player {
        id,
        name,
        club,
        club_id,
        position,
        price_tenths,
        stats,
    })
}

fn pick_price_tenths(value: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        let Some(v) = value.get(*key) else {
            continue;
        };
        let num = match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        if !num.is_finite() || num <= 0.0 || num.fract() != 0.0 || num > u32::MAX as f64 {
            return None;
        }
        return Some(num as u32);
    }
    None
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match value.get(*key) {
            Some(Value::String(s)) => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_u64() {
                return u32::try_from(num).ok();
            }
            if let Some(s) = v.as_str() {
                if let Ok(num) = s.trim().parse::<u32>() {
                    return Some(num);
                }
            }
        }
    }
    None
}

// FPL serves `form` and `selected_by_percent` as strings.
fn pick_f32(value: &Value, keys: &[&str]) -> Option<f32> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_f64() {
                return Some(num as f32);
            }
            if let Some(s) = v.as_str() {
                if let Ok(num) = s.trim().parse::<f32>() {
                    return Some(num);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_codes_accept_fpl_spellings() {
        assert_eq!(Position::from_code("gkp"), Some(Position::GK));
        assert_eq!(Position::from_code(" FWD "), Some(Position::FWD));
        assert_eq!(Position::from_code("ST"), None);
        assert_eq!(Position::from_element_type(3), Some(Position::MID));
        assert_eq!(Position::from_element_type(5), None);
    }

    #[test]
    fn price_must_be_positive_whole_tenths() {
        let v: Value = serde_json::json!({ "a": 55, "b": "60", "c": 5.5, "d": 0, "e": -10 });
        assert_eq!(pick_price_tenths(&v, &["a"]), Some(55));
        assert_eq!(pick_price_tenths(&v, &["b"]), Some(60));
        assert_eq!(pick_price_tenths(&v, &["c"]), None);
        assert_eq!(pick_price_tenths(&v, &["d"]), None);
        assert_eq!(pick_price_tenths(&v, &["e"]), None);
    }

    #[test]
    fn club_falls_back_to_team_id() {
        let v = serde_json::json!({ "id": 9, "position": "MID", "value": 70, "team": 4 });
        let p = player_from_value(&v).ok().unwrap();
        assert_eq!(p.club, "4");
        assert_eq!(p.club_id, Some(4));
        assert_eq!(p.name, "Player 9");
    }
}
