use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::{
    CaptainPick, Catalog, CatalogReport, Injury, Player, PlayerStats, Position, TransferSuggestion,
};
use crate::feed::CatalogFeed;
use crate::squad::{SQUAD_SIZE, Squad};

pub const DEFAULT_DEMO_SEED: u64 = 26;

const CLUBS: [&str; 20] = [
    "Arsenal",
    "Aston Villa",
    "Bournemouth",
    "Brentford",
    "Brighton",
    "Chelsea",
    "Crystal Palace",
    "Everton",
    "Fulham",
    "Ipswich",
    "Leicester",
    "Liverpool",
    "Man City",
    "Man Utd",
    "Newcastle",
    "Nott'm Forest",
    "Southampton",
    "Spurs",
    "West Ham",
    "Wolves",
];

const SURNAMES: [&str; 30] = [
    "Stone", "Vega", "Holt", "Nox", "Vale", "Rook", "Quinn", "Park", "Moss", "Noor", "Hale",
    "Ash", "Pike", "Gray", "Reed", "Marsh", "Keane", "Ortiz", "Blake", "Okafor", "Silva", "Lund",
    "Brooks", "Dias", "Kovac", "Mensah", "Tanaka", "Ferro", "Walsh", "Costa",
];

const INITIALS: &str = "ABCDEFGHJKLMNPRSTVW";

// Per club: 2 GK, 5 DEF, 5 MID, 3 FWD.
const CLUB_SHAPE: [(Position, usize); 4] = [
    (Position::GK, 2),
    (Position::DEF, 5),
    (Position::MID, 5),
    (Position::FWD, 3),
];

// Formation used for the recommended XI.
const XI_SHAPE: [(Position, usize); 4] = [
    (Position::GK, 1),
    (Position::DEF, 4),
    (Position::MID, 4),
    (Position::FWD, 2),
];

const CHEAPEST_TENTHS: u32 = 40;

/// Offline feed built from a seeded RNG so the same seed always yields the same catalog.
pub struct DemoFeed {
    players: Vec<Player>,
    injuries: Vec<Injury>,
    best_xi: Vec<Player>,
    next_opponents: Vec<String>,
}

impl DemoFeed {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let players = seed_players(&mut rng);
        let injuries = players
            .iter()
            .filter(|p| !p.is_available())
            .map(|p| Injury {
                player: p.name.clone(),
                club_id: p.club_id,
                club: Some(p.club.clone()),
                status: p.stats.status.clone().unwrap_or_default(),
                news: Some(injury_news(p.stats.status.as_deref())),
                chance_of_playing: p.stats.chance_of_playing,
            })
            .collect();
        let best_xi = pick_best_xi(&players);
        let next_opponents = CLUBS.iter().map(|c| c.to_string()).collect();
        Self {
            players,
            injuries,
            best_xi,
            next_opponents,
        }
    }

    pub fn all_players(&self) -> &[Player] {
        &self.players
    }
}

impl CatalogFeed for DemoFeed {
    fn label(&self) -> &'static str {
        "demo"
    }

    fn players(&self) -> Result<Catalog> {
        Ok(catalog_of(self.players.clone()))
    }

    fn best_xi(&self) -> Result<Catalog> {
        Ok(catalog_of(self.best_xi.clone()))
    }

    fn injuries(&self) -> Result<Vec<Injury>> {
        Ok(self.injuries.clone())
    }

    fn transfers(&self) -> Result<Vec<TransferSuggestion>> {
        let mut ranked: Vec<&Player> = self.players.iter().filter(|p| p.is_available()).collect();
        ranked.sort_by(|a, b| predicted_points(b).total_cmp(&predicted_points(a)));
        Ok(ranked
            .into_iter()
            .take(5)
            .map(|p| TransferSuggestion {
                name: p.name.clone(),
                predicted_points: predicted_points(p),
            })
            .collect())
    }

    fn captain(&self) -> Result<CaptainPick> {
        let best = self
            .players
            .iter()
            .filter(|p| p.is_available())
            .max_by(|a, b| predicted_points(a).total_cmp(&predicted_points(b)))
            .ok_or_else(|| anyhow::anyhow!("no valid captain found"))?;
        Ok(CaptainPick {
            name: best.name.clone(),
            predicted_points: predicted_points(best),
            next_opponent: best.stats.next_opponent.clone().or_else(|| {
                self.next_opponents
                    .iter()
                    .find(|c| **c != best.club)
                    .cloned()
            }),
            opponent_defense: Some(10.0),
        })
    }
}

fn catalog_of(players: Vec<Player>) -> Catalog {
    let report = CatalogReport {
        accepted: players.len(),
        ..CatalogReport::default()
    };
    Catalog { players, report }
}

fn predicted_points(player: &Player) -> f32 {
    let per_game = player.stats.total_points as f32 / 20.0;
    ((per_game * 0.6 + player.stats.form * 0.4) * 10.0).round() / 10.0
}

fn seed_players(rng: &mut StdRng) -> Vec<Player> {
    let mut players = Vec::with_capacity(CLUBS.len() * 15);
    let mut id = 1;
    for (club_idx, club) in CLUBS.iter().enumerate() {
        for (position, count) in CLUB_SHAPE {
            for _ in 0..count {
                players.push(seed_player(rng, id, club, club_idx as u32 + 1, position));
                id += 1;
            }
        }
    }
    players
}

fn seed_player(rng: &mut StdRng, id: u32, club: &str, club_id: u32, position: Position) -> Player {
    let (lo, hi) = match position {
        Position::GK => (40, 60),
        Position::DEF => (40, 70),
        Position::MID => (45, 130),
        Position::FWD => (45, 140),
    };
    let price_tenths: u32 = rng.gen_range(lo..=hi);
    let quality = (price_tenths - CHEAPEST_TENTHS) as f32 / (hi - CHEAPEST_TENTHS) as f32;
    let total_points = (20.0 + quality * 140.0 + rng.gen_range(-15.0..15.0_f32)).max(0.0) as i32;
    let form = ((quality * 7.0 + rng.gen_range(0.0..3.0_f32)) * 10.0).round() / 10.0;
    let minutes = rng.gen_range(300..=1800);

    let (status, chance_of_playing) = match rng.gen_range(0..100) {
        0..=3 => (Some("i".to_string()), Some(0)),
        4..=7 => (Some("d".to_string()), Some([25, 50, 75][rng.gen_range(0..3)])),
        8 => (Some("s".to_string()), Some(0)),
        _ => (Some("a".to_string()), None),
    };

    let (goals_scored, assists, clean_sheets) = match position {
        Position::GK => (0, rng.gen_range(0..=1), rng.gen_range(0..=8)),
        Position::DEF => (rng.gen_range(0..=3), rng.gen_range(0..=4), rng.gen_range(0..=8)),
        Position::MID => (rng.gen_range(0..=10), rng.gen_range(0..=9), rng.gen_range(0..=5)),
        Position::FWD => (rng.gen_range(2..=18), rng.gen_range(0..=6), 0),
    };

    let initial = INITIALS
        .chars()
        .nth(rng.gen_range(0..INITIALS.len()))
        .unwrap_or('A');
    let surname = SURNAMES[rng.gen_range(0..SURNAMES.len())];
    let opponent = CLUBS[rng.gen_range(0..CLUBS.len())];

    Player {
        id,
        name: format!("{initial}. {surname}"),
        club: club.to_string(),
        club_id: Some(club_id),
        position,
        price_tenths,
        stats: PlayerStats {
            total_points,
            form,
            selected_by_percent: ((quality * 40.0 + rng.gen_range(0.0..5.0_f32)) * 10.0).round()
                / 10.0,
            minutes,
            goals_scored,
            assists,
            clean_sheets,
            next_opponent: (opponent != club).then(|| opponent.to_string()),
            status,
            chance_of_playing,
        },
    }
}

fn injury_news(status: Option<&str>) -> String {
    match status {
        Some("i") => "Hamstring injury - expected back in 3 weeks".to_string(),
        Some("d") => "Knock - 50% chance of playing".to_string(),
        Some("s") => "Suspended for one match".to_string(),
        _ => String::new(),
    }
}

/// Greedy 1-4-4-2 by points-per-price, always keeping enough budget to fill the
/// remaining slots with the cheapest players left. Best scorer first.
fn pick_best_xi(players: &[Player]) -> Vec<Player> {
    let mut ranked: Vec<&Player> = players.iter().filter(|p| p.is_available()).collect();
    ranked.sort_by(|a, b| {
        let va = a.stats.total_points as f32 / a.price_tenths as f32;
        let vb = b.stats.total_points as f32 / b.price_tenths as f32;
        vb.total_cmp(&va)
    });
    let mut by_price = ranked.clone();
    by_price.sort_by_key(|p| p.price_tenths);

    let mut squad = Squad::new();
    for player in ranked.iter().chain(by_price.iter()).copied() {
        if squad.len() == SQUAD_SIZE {
            break;
        }
        if squad.position_counts().get(player.position) >= xi_target(player.position) {
            continue;
        }
        let reserve = cheapest_fill(&by_price, &squad, player);
        if player.price_tenths + reserve > squad.remaining_budget().tenths() {
            continue;
        }
        if let Ok(next) = squad.add(player) {
            squad = next;
        }
    }

    let mut xi = squad.members().to_vec();
    xi.sort_by(|a, b| b.stats.total_points.cmp(&a.stats.total_points));
    xi
}

fn xi_target(position: Position) -> usize {
    XI_SHAPE
        .iter()
        .find(|(pos, _)| *pos == position)
        .map(|(_, n)| *n)
        .unwrap_or(0)
}

// Cost of the cheapest way to fill the slots still open once `next` is in.
fn cheapest_fill(by_price: &[&Player], squad: &Squad, next: &Player) -> u32 {
    let counts = squad.position_counts();
    let mut total = 0;
    for (position, target) in XI_SHAPE {
        let mut need = target.saturating_sub(counts.get(position));
        if position == next.position {
            need = need.saturating_sub(1);
        }
        total += by_price
            .iter()
            .filter(|p| p.position == position && p.id != next.id && !squad.contains(p.id))
            .take(need)
            .map(|p| p.price_tenths)
            .sum::<u32>();
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_catalog() {
        let a = DemoFeed::new(7);
        let b = DemoFeed::new(7);
        assert_eq!(a.all_players(), b.all_players());
        assert_eq!(a.all_players().len(), CLUBS.len() * 15);
    }

    #[test]
    fn recommended_xi_is_legal() {
        for seed in [1, 26, 99, 2024] {
            let feed = DemoFeed::new(seed);
            let xi = feed.best_xi().unwrap().players;
            assert_eq!(xi.len(), SQUAD_SIZE, "seed {seed}");
            let squad = Squad::apply_recommended(&xi, None).expect("demo XI should be legal");
            assert!(squad.is_submittable());
        }
    }
}
