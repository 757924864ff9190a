//! Squad constraint engine.
//!
//! A [`Squad`] is a value: every operation takes the current snapshot and hands back a new one
//! (or a [`ConstraintViolation`] explaining which rule blocked it). The fields are private so the
//! only way to change a squad is through these operations, which keeps the rules below true for
//! every squad that can be observed:
//!
//! 1. at most [`SQUAD_SIZE`] members, unique by id
//! 2. per-position caps from [`position_cap`]
//! 3. at most [`CLUB_QUOTA`] members from one club
//! 4. total cost never above [`BUDGET_CAP`]
//! 5. captain / vice-captain, when set, are members and never the same player

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::catalog::{Player, PlayerId, Position};

pub const SQUAD_SIZE: usize = 11;
pub const CLUB_QUOTA: usize = 3;
pub const BUDGET_CAP: Money = Money(1000);

pub fn position_cap(position: Position) -> usize {
    match position {
        Position::GK => 1,
        Position::DEF => 5,
        Position::MID => 5,
        Position::FWD => 3,
    }
}

/// Currency held in tenths so budget arithmetic stays exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(pub u32);

impl Money {
    pub fn tenths(self) -> u32 {
        self.0
    }

    pub fn as_f32(self) -> f32 {
        self.0 as f32 / 10.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{}.{}m", self.0 / 10, self.0 % 10)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Captain,
    ViceCaptain,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Captain => "captain",
            Role::ViceCaptain => "vice-captain",
        }
    }

    fn other(self) -> Role {
        match self {
            Role::Captain => Role::ViceCaptain,
            Role::ViceCaptain => Role::Captain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintViolation {
    #[error("{name} is already selected")]
    DuplicateMember { id: PlayerId, name: String },
    #[error("{position} limit reached ({cap})")]
    PositionFull { position: Position, cap: usize },
    #[error("already {cap} players from {club}")]
    ClubQuotaExceeded { club: String, cap: usize },
    #[error("costs {price} but only {remaining} left")]
    OverBudget { price: Money, remaining: Money },
    #[error("squad already has 11 players")]
    SquadFull,
    #[error("player {id} is not in the squad")]
    NotAMember { id: PlayerId },
    #[error("player {id} cannot be both captain and vice-captain")]
    RoleClash { id: PlayerId },
}

impl ConstraintViolation {
    /// Short label for grayed-out candidate rows.
    pub fn short_reason(&self) -> &'static str {
        match self {
            ConstraintViolation::DuplicateMember { .. } => "Already selected",
            ConstraintViolation::PositionFull { .. } => "Position limit reached",
            ConstraintViolation::ClubQuotaExceeded { .. } => "Club limit reached",
            ConstraintViolation::OverBudget { .. } => "Exceeds budget",
            ConstraintViolation::SquadFull => "Squad full",
            ConstraintViolation::NotAMember { .. } => "Not in squad",
            ConstraintViolation::RoleClash { .. } => "Same captain and vice",
        }
    }
}

/// Member counts per position, indexed by [`Position::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionCounts([usize; 4]);

impl PositionCounts {
    pub fn get(&self, position: Position) -> usize {
        self.0[position.index()]
    }

    fn bump(&mut self, position: Position) {
        self.0[position.index()] += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Squad {
    members: Vec<Player>,
    captain: Option<PlayerId>,
    vice_captain: Option<PlayerId>,
}

impl Squad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &[Player] {
        &self.members
    }

    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.members.iter().map(|p| p.id).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.members.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.members.iter().find(|p| p.id == id)
    }

    pub fn captain(&self) -> Option<PlayerId> {
        self.captain
    }

    pub fn vice_captain(&self) -> Option<PlayerId> {
        self.vice_captain
    }

    pub fn role_of(&self, id: PlayerId) -> Option<Role> {
        if self.captain == Some(id) {
            Some(Role::Captain)
        } else if self.vice_captain == Some(id) {
            Some(Role::ViceCaptain)
        } else {
            None
        }
    }

    pub fn total_cost(&self) -> Money {
        Money(self.members.iter().map(|p| p.price_tenths).sum())
    }

    pub fn remaining_budget(&self) -> Money {
        Money(BUDGET_CAP.0.saturating_sub(self.total_cost().0))
    }

    pub fn position_counts(&self) -> PositionCounts {
        let mut counts = PositionCounts::default();
        for player in &self.members {
            counts.bump(player.position);
        }
        counts
    }

    pub fn club_count(&self, club: &str) -> usize {
        self.members.iter().filter(|p| p.club == club).count()
    }

    pub fn club_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for player in &self.members {
            *counts.entry(player.club.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// `DEF-MID-FWD`, the way formations are usually written.
    pub fn formation(&self) -> String {
        let counts = self.position_counts();
        format!(
            "{}-{}-{}",
            counts.get(Position::DEF),
            counts.get(Position::MID),
            counts.get(Position::FWD)
        )
    }

    pub fn open_slots(&self, position: Position) -> usize {
        position_cap(position).saturating_sub(self.position_counts().get(position))
    }

    /// First rule `player` would break, if any. Checked in a fixed order so the reported
    /// reason is stable: duplicate, squad size, position, club, budget.
    pub fn check_add(&self, player: &Player) -> Result<(), ConstraintViolation> {
        if self.contains(player.id) {
            return Err(ConstraintViolation::DuplicateMember {
                id: player.id,
                name: player.name.clone(),
            });
        }
        if self.members.len() >= SQUAD_SIZE {
            return Err(ConstraintViolation::SquadFull);
        }
        let cap = position_cap(player.position);
        if self.position_counts().get(player.position) >= cap {
            return Err(ConstraintViolation::PositionFull {
                position: player.position,
                cap,
            });
        }
        if self.club_count(&player.club) >= CLUB_QUOTA {
            return Err(ConstraintViolation::ClubQuotaExceeded {
                club: player.club.clone(),
                cap: CLUB_QUOTA,
            });
        }
        let remaining = self.remaining_budget();
        if player.price_tenths > remaining.0 {
            return Err(ConstraintViolation::OverBudget {
                price: Money(player.price_tenths),
                remaining,
            });
        }
        Ok(())
    }

    pub fn can_add(&self, player: &Player) -> bool {
        self.check_add(player).is_ok()
    }

    pub fn add(&self, player: &Player) -> Result<Squad, ConstraintViolation> {
        self.check_add(player)?;
        let mut next = self.clone();
        next.members.push(player.clone());
        Ok(next)
    }

    /// Removing a non-member returns an identical squad.
    pub fn remove(&self, id: PlayerId) -> Squad {
        let mut next = self.clone();
        next.members.retain(|p| p.id != id);
        if next.captain == Some(id) {
            next.captain = None;
        }
        if next.vice_captain == Some(id) {
            next.vice_captain = None;
        }
        next
    }

    /// Toggles `role` for `id`. Handing a role to the player holding the other one moves it:
    /// the other slot is cleared before this one is set.
    pub fn assign_role(&self, id: PlayerId, role: Role) -> Result<Squad, ConstraintViolation> {
        if !self.contains(id) {
            return Err(ConstraintViolation::NotAMember { id });
        }
        let mut next = self.clone();
        if *next.slot_mut(role) == Some(id) {
            *next.slot_mut(role) = None;
            return Ok(next);
        }
        let other = next.slot_mut(role.other());
        if *other == Some(id) {
            *other = None;
        }
        *next.slot_mut(role) = Some(id);
        Ok(next)
    }

    pub fn is_submittable(&self) -> bool {
        match (self.captain, self.vice_captain) {
            (Some(c), Some(v)) => self.members.len() == SQUAD_SIZE && c != v,
            _ => false,
        }
    }

    pub fn clear(&self) -> Squad {
        Squad::default()
    }

    /// Builds a squad from a suggested XI by replaying it through [`Squad::add`], so a suggestion
    /// that breaks a rule is refused with the first violation instead of being taken on trust.
    ///
    /// Roles default to the first two entries; `roles` overrides them as `(captain, vice)` and
    /// must name two different members.
    pub fn apply_recommended(
        xi: &[Player],
        roles: Option<(PlayerId, PlayerId)>,
    ) -> Result<Squad, ConstraintViolation> {
        let mut squad = Squad::default();
        for player in xi {
            squad = squad.add(player)?;
        }
        let (captain, vice) = match roles {
            Some((c, v)) if c == v => return Err(ConstraintViolation::RoleClash { id: c }),
            Some((c, v)) => (Some(c), Some(v)),
            None => (xi.first().map(|p| p.id), xi.get(1).map(|p| p.id)),
        };
        if let Some(id) = captain {
            squad = squad.assign_role(id, Role::Captain)?;
        }
        if let Some(id) = vice {
            squad = squad.assign_role(id, Role::ViceCaptain)?;
        }
        Ok(squad)
    }

    /// Takes the XI as-is: budget, position and club caps are NOT checked, so the result may
    /// break rules 1-4. Duplicate ids are dropped and roles still only point at members.
    /// Prefer [`Squad::apply_recommended`].
    pub fn apply_recommended_unchecked(xi: &[Player]) -> Squad {
        let mut squad = Squad::default();
        for player in xi {
            if !squad.contains(player.id) {
                squad.members.push(player.clone());
            }
        }
        squad.captain = squad.members.first().map(|p| p.id);
        squad.vice_captain = squad.members.get(1).map(|p| p.id);
        squad
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<PlayerId> {
        match role {
            Role::Captain => &mut self.captain,
            Role::ViceCaptain => &mut self.vice_captain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PlayerStats;

    fn player(id: PlayerId, position: Position, club: &str, price: u32) -> Player {
        Player {
            id,
            name: format!("P{id}"),
            club: club.to_string(),
            club_id: None,
            position,
            price_tenths: price,
            stats: PlayerStats::default(),
        }
    }

    #[test]
    fn money_formats_as_millions() {
        assert_eq!(Money(55).to_string(), "£5.5m");
        assert_eq!(Money(1000).to_string(), "£100.0m");
        assert_eq!(Money(0).to_string(), "£0.0m");
    }

    #[test]
    fn duplicate_is_reported_before_squad_full() {
        let gk = player(1, Position::GK, "A", 40);
        let squad = Squad::new().add(&gk).unwrap();
        assert!(matches!(
            squad.check_add(&gk),
            Err(ConstraintViolation::DuplicateMember { id: 1, .. })
        ));
    }

    #[test]
    fn exact_budget_is_allowed() {
        let squad = Squad::new()
            .add(&player(1, Position::MID, "A", 600))
            .unwrap();
        let last = player(2, Position::MID, "B", 400);
        let squad = squad.add(&last).unwrap();
        assert_eq!(squad.remaining_budget(), Money(0));
        assert!(!squad.can_add(&player(3, Position::MID, "C", 1)));
    }

    #[test]
    fn moving_captain_to_vice_clears_captain() {
        let squad = Squad::new()
            .add(&player(1, Position::MID, "A", 50))
            .unwrap()
            .assign_role(1, Role::Captain)
            .unwrap()
            .assign_role(1, Role::ViceCaptain)
            .unwrap();
        assert_eq!(squad.captain(), None);
        assert_eq!(squad.vice_captain(), Some(1));
        assert_eq!(squad.role_of(1), Some(Role::ViceCaptain));
    }

    #[test]
    fn formation_counts_outfield_positions() {
        let squad = Squad::new()
            .add(&player(1, Position::GK, "A", 40))
            .unwrap()
            .add(&player(2, Position::DEF, "B", 40))
            .unwrap()
            .add(&player(3, Position::FWD, "C", 40))
            .unwrap();
        assert_eq!(squad.formation(), "1-0-1");
        assert_eq!(squad.open_slots(Position::GK), 0);
        assert_eq!(squad.open_slots(Position::FWD), 2);
    }
}
