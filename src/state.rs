use std::collections::VecDeque;

use crate::catalog::{
    CaptainPick, Catalog, CatalogReport, Injury, Player, PlayerId, Position, TransferSuggestion,
};
use crate::rating::{RatingOutcome, SubmitError};
use crate::squad::{ConstraintViolation, Role, Squad};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Players,
    Injuries,
    Transfers,
    Captain,
    TeamBuilder,
}

impl Screen {
    pub const ALL: [Screen; 6] = [
        Screen::Dashboard,
        Screen::Players,
        Screen::Injuries,
        Screen::Transfers,
        Screen::Captain,
        Screen::TeamBuilder,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderFocus {
    Candidates,
    Squad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Points,
    Form,
    Price,
    Name,
}

/// Headline numbers for the dashboard, recomputed from the loaded catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary<'a> {
    pub total_players: usize,
    pub injured: usize,
    pub captain: Option<&'a str>,
    pub average_points: f32,
    pub by_position: [usize; 4],
    pub top_scorers: Vec<&'a Player>,
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetCatalog {
        source: &'static str,
        catalog: Catalog,
    },
    CatalogFailed(String),
    SetBestXi(Vec<Player>),
    SetInjuries(Vec<Injury>),
    SetTransfers(Vec<TransferSuggestion>),
    SetCaptain(CaptainPick),
    CaptainFailed(String),
    Rated {
        players: Vec<PlayerId>,
        outcome: RatingOutcome,
    },
    RatingFailed {
        players: Vec<PlayerId>,
        message: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchCatalog,
    FetchBestXi,
    FetchInjuries,
    FetchTransfers,
    FetchCaptain,
    RateSquad { squad: Squad },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub players: Vec<Player>,
    pub catalog_source: Option<&'static str>,
    pub catalog_report: CatalogReport,
    pub catalog_loading: bool,
    pub catalog_error: Option<String>,
    pub best_xi: Vec<Player>,
    pub injuries: Vec<Injury>,
    pub transfers: Vec<TransferSuggestion>,
    pub captain: Option<CaptainPick>,
    pub captain_error: Option<String>,
    pub squad: Squad,
    pub builder_focus: BuilderFocus,
    pub squad_selected: usize,
    pub rating: Option<RatingOutcome>,
    pub rating_error: Option<String>,
    pub rating_pending: Option<Vec<PlayerId>>,
    pub selected: usize,
    pub scroll: u16,
    pub search: String,
    pub search_active: bool,
    pub position_filter: Option<Position>,
    pub club_filter: Option<String>,
    pub detail_open: bool,
    pub sort: SortMode,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Dashboard,
            players: Vec::with_capacity(700),
            catalog_source: None,
            catalog_report: CatalogReport::default(),
            catalog_loading: true,
            catalog_error: None,
            best_xi: Vec::new(),
            injuries: Vec::new(),
            transfers: Vec::new(),
            captain: None,
            captain_error: None,
            squad: Squad::new(),
            builder_focus: BuilderFocus::Candidates,
            squad_selected: 0,
            rating: None,
            rating_error: None,
            rating_pending: None,
            selected: 0,
            scroll: 0,
            search: String::new(),
            search_active: false,
            position_filter: None,
            club_filter: None,
            detail_open: false,
            sort: SortMode::Points,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            self.screen = screen;
            self.selected = 0;
            self.scroll = 0;
            self.search_active = false;
            self.detail_open = false;
        }
    }

    pub fn next_screen(&mut self) {
        let idx = Screen::ALL.iter().position(|s| *s == self.screen).unwrap_or(0);
        self.set_screen(Screen::ALL[(idx + 1) % Screen::ALL.len()]);
    }

    pub fn cycle_sort(&mut self) {
        self.sort = match self.sort {
            SortMode::Points => SortMode::Form,
            SortMode::Form => SortMode::Price,
            SortMode::Price => SortMode::Name,
            SortMode::Name => SortMode::Points,
        };
        self.selected = 0;
    }

    pub fn cycle_position_filter(&mut self) {
        self.position_filter = match self.position_filter {
            None => Some(Position::GK),
            Some(Position::GK) => Some(Position::DEF),
            Some(Position::DEF) => Some(Position::MID),
            Some(Position::MID) => Some(Position::FWD),
            Some(Position::FWD) => None,
        };
        self.selected = 0;
    }

    /// Steps through the clubs present in the catalog, alphabetically, then back to all clubs.
    pub fn cycle_club_filter(&mut self) {
        let clubs = self.clubs();
        self.club_filter = match &self.club_filter {
            None => clubs.first().map(|c| c.to_string()),
            Some(current) => clubs
                .iter()
                .position(|c| *c == current.as_str())
                .and_then(|idx| clubs.get(idx + 1))
                .map(|c| c.to_string()),
        };
        self.selected = 0;
    }

    pub fn clubs(&self) -> Vec<&str> {
        let mut clubs: Vec<&str> = self.players.iter().map(|p| p.club.as_str()).collect();
        clubs.sort_unstable();
        clubs.dedup();
        clubs
    }

    pub fn push_search_char(&mut self, ch: char) {
        self.search.push(ch);
        self.selected = 0;
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
        self.selected = 0;
    }

    /// Players matching the search text, position and club filters, in the current sort order.
    pub fn filtered_players(&self) -> Vec<&Player> {
        let needle = self.search.trim().to_lowercase();
        let mut rows: Vec<&Player> = self
            .players
            .iter()
            .filter(|p| self.position_filter.is_none_or(|pos| p.position == pos))
            .filter(|p| self.club_filter.as_deref().is_none_or(|club| p.club == club))
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .collect();
        match self.sort {
            SortMode::Points => {
                rows.sort_by(|a, b| b.stats.total_points.cmp(&a.stats.total_points))
            }
            SortMode::Form => rows.sort_by(|a, b| b.stats.form.total_cmp(&a.stats.form)),
            SortMode::Price => rows.sort_by(|a, b| b.price_tenths.cmp(&a.price_tenths)),
            SortMode::Name => rows.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        rows
    }

    /// Injuries matching the search text and club filter, worst status first.
    pub fn sorted_injuries(&self) -> Vec<&Injury> {
        let needle = self.search.trim().to_lowercase();
        let mut rows: Vec<&Injury> = self
            .injuries
            .iter()
            .filter(|i| {
                self.club_filter
                    .as_deref()
                    .is_none_or(|club| i.club.as_deref() == Some(club))
            })
            .filter(|i| needle.is_empty() || i.player.to_lowercase().contains(&needle))
            .collect();
        rows.sort_by(|a, b| {
            a.severity_rank()
                .cmp(&b.severity_rank())
                .then_with(|| a.player.cmp(&b.player))
        });
        rows
    }

    /// Squad members grouped GK, DEF, MID, FWD; insertion order within a group.
    pub fn squad_rows(&self) -> Vec<&Player> {
        let mut rows = Vec::with_capacity(self.squad.len());
        for position in Position::ALL {
            rows.extend(self.squad.members().iter().filter(|p| p.position == position));
        }
        rows
    }

    pub fn selected_candidate(&self) -> Option<&Player> {
        self.filtered_players().get(self.selected).copied()
    }

    pub fn toggle_detail(&mut self) {
        self.detail_open = !self.detail_open
            && self.screen == Screen::Players
            && self.selected_candidate().is_some();
    }

    pub fn dashboard(&self) -> DashboardSummary<'_> {
        let mut by_position = [0; 4];
        for player in &self.players {
            by_position[player.position.index()] += 1;
        }
        let average_points = if self.players.is_empty() {
            0.0
        } else {
            let total: i64 = self.players.iter().map(|p| p.stats.total_points as i64).sum();
            total as f32 / self.players.len() as f32
        };
        let mut top_scorers: Vec<&Player> = self.players.iter().collect();
        top_scorers.sort_by(|a, b| b.stats.total_points.cmp(&a.stats.total_points));
        top_scorers.truncate(5);
        DashboardSummary {
            total_players: self.players.len(),
            injured: self.injuries.len(),
            captain: self.captain.as_ref().map(|c| c.name.as_str()),
            average_points,
            by_position,
            top_scorers,
        }
    }

    pub fn selected_member_id(&self) -> Option<PlayerId> {
        self.squad_rows().get(self.squad_selected).map(|p| p.id)
    }

    pub fn candidate_block(&self, player: &Player) -> Option<ConstraintViolation> {
        self.squad.check_add(player).err()
    }

    pub fn select_next(&mut self) {
        let total = self.current_list_len();
        let cursor = self.cursor_mut();
        if total == 0 {
            *cursor = 0;
        } else {
            *cursor = (*cursor + 1) % total;
        }
    }

    pub fn select_prev(&mut self) {
        let total = self.current_list_len();
        let cursor = self.cursor_mut();
        if total == 0 {
            *cursor = 0;
        } else if *cursor == 0 {
            *cursor = total - 1;
        } else {
            *cursor -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let players = self.filtered_players().len();
        self.selected = clamp_index(self.selected, players);
        self.squad_selected = clamp_index(self.squad_selected, self.squad.len());
    }

    pub fn toggle_builder_focus(&mut self) {
        self.builder_focus = match self.builder_focus {
            BuilderFocus::Candidates => BuilderFocus::Squad,
            BuilderFocus::Squad => BuilderFocus::Candidates,
        };
    }

    pub fn current_list_len(&self) -> usize {
        match self.screen {
            Screen::Players => self.filtered_players().len(),
            Screen::Dashboard => 0,
            Screen::Injuries => self.sorted_injuries().len(),
            Screen::Transfers => self.transfers.len(),
            Screen::Captain => 0,
            Screen::TeamBuilder => match self.builder_focus {
                BuilderFocus::Candidates => self.filtered_players().len(),
                BuilderFocus::Squad => self.squad.len(),
            },
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        if self.screen == Screen::TeamBuilder && self.builder_focus == BuilderFocus::Squad {
            &mut self.squad_selected
        } else {
            &mut self.selected
        }
    }

    fn replace_squad(&mut self, squad: Squad) {
        if squad != self.squad {
            self.rating = None;
            self.rating_error = None;
        }
        self.squad = squad;
        self.squad_selected = clamp_index(self.squad_selected, self.squad.len());
    }

    pub fn add_candidate(&mut self, player: &Player) -> Result<(), ConstraintViolation> {
        match self.squad.add(player) {
            Ok(next) => {
                self.push_log(format!(
                    "[INFO] Added {} ({}, {}) - {} left",
                    player.name,
                    player.position,
                    player.club,
                    next.remaining_budget()
                ));
                self.replace_squad(next);
                Ok(())
            }
            Err(violation) => {
                tracing::debug!(player = player.id, %violation, "add rejected");
                self.push_log(format!("[WARN] Cannot add {}: {violation}", player.name));
                Err(violation)
            }
        }
    }

    pub fn add_selected_candidate(&mut self) -> Result<(), ConstraintViolation> {
        let Some(player) = self.selected_candidate().cloned() else {
            self.push_log("[INFO] No player selected");
            return Ok(());
        };
        self.add_candidate(&player)
    }

    pub fn remove_member(&mut self, id: PlayerId) {
        let name = self.squad.get(id).map(|p| p.name.clone());
        let next = self.squad.remove(id);
        self.replace_squad(next);
        if let Some(name) = name {
            self.push_log(format!("[INFO] Removed {name}"));
        }
    }

    pub fn remove_selected_member(&mut self) {
        if let Some(id) = self.selected_member_id() {
            self.remove_member(id);
        }
    }

    pub fn toggle_role(&mut self, id: PlayerId, role: Role) -> Result<(), ConstraintViolation> {
        match self.squad.assign_role(id, role) {
            Ok(next) => {
                let name = next.get(id).map(|p| p.name.clone()).unwrap_or_default();
                let msg = if next.role_of(id) == Some(role) {
                    format!("[INFO] {name} is now {}", role.label())
                } else {
                    format!("[INFO] {name} is no longer {}", role.label())
                };
                self.replace_squad(next);
                self.push_log(msg);
                Ok(())
            }
            Err(violation) => {
                self.push_log(format!("[WARN] Cannot make {}: {violation}", role.label()));
                Err(violation)
            }
        }
    }

    pub fn toggle_role_on_selected(&mut self, role: Role) -> Result<(), ConstraintViolation> {
        let id = match self.builder_focus {
            BuilderFocus::Squad => self.selected_member_id(),
            BuilderFocus::Candidates => self.selected_candidate().map(|p| p.id),
        };
        match id {
            Some(id) => self.toggle_role(id, role),
            None => Ok(()),
        }
    }

    pub fn apply_recommended(&mut self) -> Result<(), ConstraintViolation> {
        if self.best_xi.is_empty() {
            self.push_log("[INFO] No recommended XI loaded yet");
            return Ok(());
        }
        match Squad::apply_recommended(&self.best_xi, None) {
            Ok(next) => {
                self.replace_squad(next);
                self.push_log(format!(
                    "[INFO] Recommended XI loaded ({}), {} left",
                    self.squad.formation(),
                    self.squad.remaining_budget()
                ));
                Ok(())
            }
            Err(violation) => {
                tracing::warn!(%violation, "recommended XI rejected");
                self.push_log(format!("[WARN] Recommended XI rejected: {violation}"));
                Err(violation)
            }
        }
    }

    pub fn clear_squad(&mut self) {
        let next = self.squad.clear();
        self.replace_squad(next);
        self.rating = None;
        self.rating_error = None;
        self.rating_pending = None;
        self.push_log("[INFO] Squad cleared");
    }

    /// Snapshot to hand to the provider for rating, or why it can't be rated yet.
    pub fn begin_rating(&mut self) -> Result<Squad, SubmitError> {
        if !self.squad.is_submittable() {
            self.push_log(format!("[WARN] {}", SubmitError::NotSubmittable));
            return Err(SubmitError::NotSubmittable);
        }
        self.rating_pending = Some(self.squad.member_ids());
        self.rating_error = None;
        self.push_log("[INFO] Rating request sent");
        Ok(self.squad.clone())
    }

    pub fn rating_in_flight(&self) -> bool {
        self.rating_pending.is_some()
    }

    fn take_pending_for(&mut self, players: &[PlayerId]) -> bool {
        let current = self.squad.member_ids();
        let matches_pending = self
            .rating_pending
            .as_deref()
            .is_some_and(|pending| pending == players);
        if matches_pending {
            self.rating_pending = None;
        }
        matches_pending && current == players
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetCatalog { source, catalog } => {
            let rejected = catalog.report.rejected();
            state.players = catalog.players;
            state.catalog_report = catalog.report;
            state.catalog_source = Some(source);
            state.catalog_loading = false;
            state.catalog_error = None;
            state.clamp_selection();
            state.push_log(format!(
                "[INFO] Catalog loaded from {source}: {} players",
                state.players.len()
            ));
            if rejected > 0 {
                state.push_log(format!("[WARN] Skipped {rejected} malformed player records"));
            }
        }
        Delta::CatalogFailed(message) => {
            state.catalog_loading = false;
            state.push_log(format!("[WARN] Catalog fetch error: {message}"));
            state.catalog_error = Some(message);
        }
        Delta::SetBestXi(players) => {
            state.best_xi = players;
        }
        Delta::SetInjuries(injuries) => {
            state.injuries = injuries;
        }
        Delta::SetTransfers(transfers) => {
            state.transfers = transfers;
        }
        Delta::SetCaptain(pick) => {
            state.captain = Some(pick);
            state.captain_error = None;
        }
        Delta::CaptainFailed(message) => {
            state.captain_error = Some(message);
        }
        Delta::Rated { players, outcome } => {
            if state.take_pending_for(&players) {
                state.push_log(format!(
                    "[INFO] Team rated {:.0}/100 at {}",
                    outcome.rating,
                    chrono::Local::now().format("%H:%M:%S")
                ));
                state.rating = Some(outcome);
                state.rating_error = None;
            } else {
                state.push_log("[INFO] Discarded rating for an older squad");
            }
        }
        Delta::RatingFailed { players, message } => {
            if state.take_pending_for(&players) {
                state.push_log(format!("[ERROR] Rating failed: {message}"));
                state.rating_error = Some(message);
            } else {
                state.push_log(format!("[WARN] Rating failed for an older squad: {message}"));
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn clamp_index(idx: usize, total: usize) -> usize {
    if total == 0 { 0 } else { idx.min(total - 1) }
}

pub fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Dashboard => "DASHBOARD",
        Screen::Players => "PLAYERS",
        Screen::Injuries => "INJURIES",
        Screen::Transfers => "TRANSFERS",
        Screen::Captain => "CAPTAIN",
        Screen::TeamBuilder => "TEAM BUILDER",
    }
}

pub fn sort_label(sort: SortMode) -> &'static str {
    match sort {
        SortMode::Points => "PTS",
        SortMode::Form => "FORM",
        SortMode::Price => "PRICE",
        SortMode::Name => "NAME",
    }
}
