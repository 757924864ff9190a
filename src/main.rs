use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use fpl_terminal::catalog::{Player, Position};
use fpl_terminal::config::AppConfig;
use fpl_terminal::demo_data::DemoFeed;
use fpl_terminal::feed::{ApiFeed, CatalogFeed};
use fpl_terminal::rating::{HttpRatingService, OfflineRatingService, RatingService};
use fpl_terminal::squad::{BUDGET_CAP, Role, SQUAD_SIZE, position_cap};
use fpl_terminal::state::{
    self, AppState, BuilderFocus, ProviderCommand, Screen, apply_delta, screen_label, sort_label,
};
use fpl_terminal::{http_client, logging, provider};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.state.search_active = false,
                KeyCode::Backspace => self.state.pop_search_char(),
                KeyCode::Char(ch) => self.state.push_search_char(ch),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.set_screen(Screen::Dashboard),
            KeyCode::Char('2') => self.state.set_screen(Screen::Players),
            KeyCode::Char('3') => self.state.set_screen(Screen::Injuries),
            KeyCode::Char('4') => self.state.set_screen(Screen::Transfers),
            KeyCode::Char('5') => self.state.set_screen(Screen::Captain),
            KeyCode::Char('6') => self.state.set_screen(Screen::TeamBuilder),
            KeyCode::Tab => self.state.next_screen(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('/') => self.state.search_active = true,
            KeyCode::Esc => {
                self.state.search.clear();
                self.state.help_overlay = false;
                self.state.detail_open = false;
            }
            KeyCode::Char('p') => self.state.cycle_position_filter(),
            KeyCode::Char('l') => self.state.cycle_club_filter(),
            KeyCode::Enter if self.state.screen == Screen::Players => self.state.toggle_detail(),
            KeyCode::Char('s') => self.state.cycle_sort(),
            KeyCode::Char('u') => self.refresh_all(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ if self.state.screen == Screen::TeamBuilder => self.on_builder_key(key),
            _ => {}
        }
    }

    fn on_builder_key(&mut self, key: KeyEvent) {
        // Violations are already logged to the console by AppState.
        let _ = match key.code {
            KeyCode::Enter | KeyCode::Char('a') => match self.state.builder_focus {
                BuilderFocus::Candidates => self.state.add_selected_candidate(),
                BuilderFocus::Squad => Ok(()),
            },
            KeyCode::Char('x') | KeyCode::Delete => {
                self.state.remove_selected_member();
                Ok(())
            }
            KeyCode::Char('c') => self.state.toggle_role_on_selected(Role::Captain),
            KeyCode::Char('v') => self.state.toggle_role_on_selected(Role::ViceCaptain),
            KeyCode::Char('r') => self.state.apply_recommended(),
            KeyCode::Char('C') => {
                self.state.clear_squad();
                Ok(())
            }
            KeyCode::Char('f') => {
                self.state.toggle_builder_focus();
                Ok(())
            }
            KeyCode::Char('R') => {
                self.request_rating();
                Ok(())
            }
            _ => Ok(()),
        };
    }

    fn request_rating(&mut self) {
        if self.state.rating_in_flight() {
            self.state.push_log("[INFO] Rating already in progress");
            return;
        }
        let Ok(squad) = self.state.begin_rating() else {
            return;
        };
        if !self.send(ProviderCommand::RateSquad { squad }) {
            self.state.rating_pending = None;
            self.state.push_log("[WARN] Rating request failed");
        }
    }

    fn refresh_all(&mut self) {
        let sent = [
            ProviderCommand::FetchCatalog,
            ProviderCommand::FetchBestXi,
            ProviderCommand::FetchInjuries,
            ProviderCommand::FetchTransfers,
            ProviderCommand::FetchCaptain,
        ]
        .into_iter()
        .all(|cmd| self.send(cmd));
        if sent {
            self.state.catalog_loading = true;
            self.state.push_log("[INFO] Refresh requested");
        } else {
            self.state.push_log("[WARN] Refresh request failed");
        }
    }

    fn send(&self, cmd: ProviderCommand) -> bool {
        match &self.cmd_tx {
            Some(tx) => tx.send(cmd).is_ok(),
            None => false,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    logging::init(&config.log_file)?;
    http_client::set_request_timeout(config.request_timeout.as_secs());
    tracing::info!(
        api_base = %config.api_base,
        offline = config.offline,
        "starting fpl_terminal"
    );

    let feed: Box<dyn CatalogFeed>;
    let rater: Box<dyn RatingService + Send>;
    if config.offline {
        let demo = DemoFeed::new(config.demo_seed);
        rater = Box::new(OfflineRatingService::new(demo.all_players().to_vec()));
        feed = Box::new(demo);
    } else {
        feed = Box::new(ApiFeed::new(config.api_base.clone()));
        rater = Box::new(HttpRatingService::new(config.api_base.clone()));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let _provider = provider::spawn_provider(tx, cmd_rx, feed, rater, config.catalog_refresh);

    let mut app = App::new(Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "ui loop failed");
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                    app.state.clamp_selection();
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Dashboard => render_dashboard(frame, chunks[1], &app.state),
        Screen::Players => render_players(frame, chunks[1], &app.state),
        Screen::Injuries => render_injuries(frame, chunks[1], &app.state),
        Screen::Transfers => render_transfers(frame, chunks[1], &app.state),
        Screen::Captain => render_captain(frame, chunks[1], &app.state),
        Screen::TeamBuilder => render_builder(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let tabs = Screen::ALL
        .iter()
        .enumerate()
        .map(|(idx, screen)| {
            if *screen == state.screen {
                format!("[{} {}]", idx + 1, screen_label(*screen))
            } else {
                format!(" {} {} ", idx + 1, screen_label(*screen))
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let source = match (state.catalog_loading, state.catalog_source) {
        (true, _) => "loading...".to_string(),
        (false, Some(src)) => format!("{} players ({src})", state.players.len()),
        (false, None) => "no catalog".to_string(),
    };
    let filter = state
        .position_filter
        .map(|p| p.code())
        .unwrap_or("ALL");
    let club = state.club_filter.as_deref().unwrap_or("ALL");
    let search = if state.search_active {
        format!("/{}_", state.search)
    } else if state.search.is_empty() {
        "-".to_string()
    } else {
        format!("/{}", state.search)
    };
    let line1 = format!(" FPL TERMINAL | {source}");
    let line2 = format!(
        " {tabs} | Pos: {filter} | Club: {club} | Sort: {} | Search: {search}",
        sort_label(state.sort)
    );
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::TeamBuilder => {
            "a/Enter Add | x Remove | c Captain | v Vice | r Recommended | C Clear | R Rate | f Focus | ? Help | q Quit".to_string()
        }
        Screen::Players => {
            "Enter Details | / Search | p Position | l Club | s Sort | u Refresh | ? Help | q Quit".to_string()
        }
        _ => "1-6/Tab Screens | j/k Move | / Search | p Position | l Club | s Sort | u Refresh | ? Help | q Quit".to_string(),
    }
}

fn player_columns() -> [Constraint; 8] {
    [
        Constraint::Min(18),
        Constraint::Length(15),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(12),
    ]
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let summary = state.dashboard();

    let mut overview = vec![
        format!("Players: {}", summary.total_players),
        format!("Flagged: {}", summary.injured),
        format!("Average points: {:.1}", summary.average_points),
        format!("Captain pick: {}", summary.captain.unwrap_or("-")),
        String::new(),
    ];
    for pos in Position::ALL {
        overview.push(format!(
            "{:<12}{}",
            pos.plural_label(),
            summary.by_position[pos.index()]
        ));
    }
    let left = Paragraph::new(overview.join("\n"))
        .block(Block::default().title("Overview").borders(Borders::ALL));
    frame.render_widget(left, columns[0]);

    let top = if summary.top_scorers.is_empty() {
        "No players loaded".to_string()
    } else {
        summary
            .top_scorers
            .iter()
            .enumerate()
            .map(|(idx, p)| {
                format!(
                    "{}. {} ({}, {}) {} pts",
                    idx + 1,
                    p.name,
                    p.club,
                    p.position.code(),
                    p.stats.total_points
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let right = Paragraph::new(top)
        .block(Block::default().title("Top Scorers").borders(Borders::ALL));
    frame.render_widget(right, columns[1]);
}

fn render_player_detail(frame: &mut Frame, area: Rect, player: &Player) {
    let stats = &player.stats;
    let mut lines = vec![
        player.name.clone(),
        format!("{} | {}", player.club, player.position.code()),
        String::new(),
        format!("Price:        £{:.1}m", player.price()),
        format!("Points:       {}", stats.total_points),
        format!("Form:         {:.1}", stats.form),
        format!("Selected by:  {:.1}%", stats.selected_by_percent),
        format!("Minutes:      {}", stats.minutes),
        format!("Goals:        {}", stats.goals_scored),
        format!("Assists:      {}", stats.assists),
        format!("Clean sheets: {}", stats.clean_sheets),
    ];
    if let Some(opp) = &stats.next_opponent {
        lines.push(format!("Next:         {opp}"));
    }
    let status = stats
        .status
        .as_deref()
        .map(fpl_terminal::catalog::status_label)
        .unwrap_or("Available");
    lines.push(format!("Status:       {status}"));
    if let Some(chance) = stats.chance_of_playing {
        lines.push(format!("Chance:       {chance}%"));
    }
    let panel = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Player").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let area = match (state.detail_open, state.selected_candidate()) {
        (true, Some(player)) => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(40), Constraint::Length(34)])
                .split(area);
            render_player_detail(frame, columns[1], player);
            columns[0]
        }
        _ => area,
    };
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = player_columns();
    let header_style = Style::default().add_modifier(Modifier::BOLD);
    render_row(
        frame,
        sections[0],
        &widths,
        &["Name", "Club", "Pos", "Price", "Pts", "Form", "Sel%", "Status"],
        header_style,
    );

    let list_area = sections[1];
    if let Some(err) = &state.catalog_error {
        if state.players.is_empty() {
            let msg = Paragraph::new(format!("Catalog unavailable: {err}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(msg, list_area);
            return;
        }
    }

    let rows = state.filtered_players();
    if rows.is_empty() {
        let empty = Paragraph::new(if state.catalog_loading {
            "Loading players..."
        } else {
            "No players match"
        })
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let (start, end) = visible_range(state.selected, rows.len(), list_area.height as usize);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let player = rows[idx];
        let style = if idx == state.selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let status = player
            .stats
            .status
            .as_deref()
            .map(fpl_terminal::catalog::status_label)
            .unwrap_or("Available");
        render_row(
            frame,
            row_area,
            &widths,
            &[
                player.name.as_str(),
                player.club.as_str(),
                player.position.code(),
                format!("£{:.1}m", player.price()).as_str(),
                player.stats.total_points.to_string().as_str(),
                format!("{:.1}", player.stats.form).as_str(),
                format!("{:.1}", player.stats.selected_by_percent).as_str(),
                status,
            ],
            style,
        );
    }
}

fn render_injuries(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = state.sorted_injuries();
    let text = if rows.is_empty() {
        "No injury news".to_string()
    } else {
        let visible = area.height.saturating_sub(2) as usize;
        let (start, end) = visible_range(state.selected, rows.len(), visible);
        (start..end)
            .map(|idx| {
                let injury = rows[idx];
                let prefix = if idx == state.selected { "> " } else { "  " };
                let chance = injury
                    .chance_of_playing
                    .map(|c| format!("{c}%"))
                    .unwrap_or_else(|| "-".to_string());
                format!(
                    "{prefix}{:<20} {:<15} {:<12} {:>4}  {}",
                    injury.player,
                    injury.club.as_deref().unwrap_or("-"),
                    injury.status_label(),
                    chance,
                    injury.news.as_deref().unwrap_or("")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let panel =
        Paragraph::new(text).block(Block::default().title("Injuries").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn render_transfers(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = if state.transfers.is_empty() {
        "No transfer suggestions".to_string()
    } else {
        state
            .transfers
            .iter()
            .enumerate()
            .map(|(idx, t)| {
                let prefix = if idx == state.selected { "> " } else { "  " };
                format!("{prefix}{:>2}. {:<24} {:>5.1} pts", idx + 1, t.name, t.predicted_points)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let panel = Paragraph::new(text)
        .block(Block::default().title("Transfer Suggestions").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn render_captain(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = match (&state.captain, &state.captain_error) {
        (Some(pick), _) => {
            let mut lines = vec![
                format!("Captain: {}", pick.name),
                format!("Predicted points: {:.1}", pick.predicted_points),
            ];
            if let Some(opp) = &pick.next_opponent {
                lines.push(format!("Next opponent: {opp}"));
            }
            if let Some(def) = pick.opponent_defense {
                lines.push(format!("Opponent defense: {def:.1}"));
            }
            lines.join("\n")
        }
        (None, Some(err)) => format!("No captain pick: {err}"),
        (None, None) => "Loading captain pick...".to_string(),
    };
    let panel = Paragraph::new(text)
        .block(Block::default().title("Captain Pick").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn render_builder(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(1),
            Constraint::Length(7),
        ])
        .split(columns[1]);

    render_candidates(frame, columns[0], state);

    let summary = Paragraph::new(summary_text(state))
        .block(Block::default().title("Budget").borders(Borders::ALL));
    frame.render_widget(summary, right[0]);

    render_squad(frame, right[1], state);

    let rating = Paragraph::new(rating_text(state))
        .block(Block::default().title("Rating").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(rating, right[2]);
}

fn focus_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

fn render_candidates(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.builder_focus == BuilderFocus::Candidates;
    let block = focus_block("Candidates", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let rows = state.filtered_players();
    if rows.is_empty() {
        let empty = Paragraph::new("No players match").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let (start, end) = visible_range(state.selected, rows.len(), inner.height as usize);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            let player = rows[idx];
            let block = state.candidate_block(player);
            let mut style = match block {
                Some(_) => Style::default().fg(Color::DarkGray),
                None => Style::default(),
            };
            if focused && idx == state.selected {
                style = style.bg(Color::DarkGray).fg(Color::White);
            }
            let reason = block.map(|v| v.short_reason()).unwrap_or("");
            Line::styled(
                format!(
                    "{:<3} {:<18} {:<14} £{:>4.1}m {:>4}  {reason}",
                    player.position.code(),
                    truncate(&player.name, 18),
                    truncate(&player.club, 14),
                    player.price(),
                    player.stats.total_points
                ),
                style,
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn summary_text(state: &AppState) -> String {
    let squad = &state.squad;
    let counts = squad.position_counts();
    let quota = Position::ALL
        .iter()
        .map(|p| format!("{} {}/{}", p.code(), counts.get(*p), position_cap(*p)))
        .collect::<Vec<_>>()
        .join("  ");
    let (used, cap) = (squad.total_cost(), BUDGET_CAP);
    let ready = if squad.is_submittable() {
        "ready to rate"
    } else {
        "not ready"
    };
    format!(
        "Players {}/{SQUAD_SIZE}  Formation {}\nSpent {used} of {cap}  Left {}\n{quota}\n{ready}",
        squad.len(),
        squad.formation(),
        squad.remaining_budget(),
    )
}

fn render_squad(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.builder_focus == BuilderFocus::Squad;
    let block = focus_block("Squad", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = state.squad_rows();
    if rows.is_empty() {
        let empty = Paragraph::new("Empty squad. Add players or press r for the recommended XI")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, inner);
        return;
    }

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .map(|(idx, player)| {
            let style = if focused && idx == state.squad_selected {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default()
            };
            Line::styled(member_line(state, player), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn member_line(state: &AppState, player: &Player) -> String {
    let tag = match state.squad.role_of(player.id) {
        Some(Role::Captain) => "(C) ",
        Some(Role::ViceCaptain) => "(VC)",
        None => "    ",
    };
    format!(
        "{:<3} {tag} {:<18} {:<12} £{:.1}m",
        player.position.code(),
        truncate(&player.name, 18),
        truncate(&player.club, 12),
        player.price()
    )
}

fn rating_text(state: &AppState) -> String {
    if state.rating_in_flight() {
        return "Rating in progress...".to_string();
    }
    if let Some(err) = &state.rating_error {
        return format!("Rating failed: {err}");
    }
    match &state.rating {
        Some(outcome) => {
            let mut lines = vec![format!("Team rating: {:.0}/100", outcome.rating)];
            if outcome.weaknesses.is_empty() {
                lines.push("No weaknesses flagged".to_string());
            } else {
                lines.extend(outcome.weaknesses.iter().map(|w| format!("- {w}")));
            }
            lines.join("\n")
        }
        None => "Press R to rate a complete squad".to_string(),
    }
}

fn render_row(frame: &mut Frame, area: Rect, widths: &[Constraint], cells: &[&str], style: Style) {
    if style.bg.is_some() {
        frame.render_widget(Block::default().style(style), area);
    }
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    for (col, text) in cols.iter().zip(cells) {
        frame.render_widget(Paragraph::new(*text).style(style), *col);
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "Console is empty".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "FPL Terminal - Help",
        "",
        "Global:",
        "  1-6 / Tab    Switch screen",
        "  j/k or ↑/↓   Move",
        "  /            Search by name (Enter/Esc to finish)",
        "  p            Cycle position filter",
        "  l            Cycle club filter",
        "  s            Cycle sort mode",
        "  u            Refresh from feed",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Players:",
        "  Enter        Toggle player details",
        "",
        "Team Builder:",
        "  f            Focus candidates / squad",
        "  a / Enter    Add selected candidate",
        "  x            Remove selected member",
        "  c / v        Toggle captain / vice-captain",
        "  r            Load recommended XI",
        "  C            Clear squad",
        "  R            Rate squad (11 players, C and VC)",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
