use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use fpl_terminal::catalog::parse_players_json;
use fpl_terminal::demo_data::DemoFeed;
use fpl_terminal::feed::CatalogFeed;
use fpl_terminal::squad::Squad;
use fpl_terminal::state::{AppState, Delta, apply_delta};

fn players_json(feed: &DemoFeed) -> String {
    let players = feed.all_players();
    let rows: Vec<serde_json::Value> = players
        .iter()
        .map(|p| {
            serde_json::json!({
                "id": p.id,
                "name": p.name,
                "team_name": p.club,
                "team_id": p.club_id,
                "position": p.position.code(),
                "value": p.price_tenths,
                "total_points": p.stats.total_points,
                "form": format!("{:.1}", p.stats.form),
                "selected_by_percent": format!("{:.1}", p.stats.selected_by_percent),
                "status": p.stats.status,
            })
        })
        .collect();
    serde_json::json!({ "players": rows }).to_string()
}

fn bench_players_parse(c: &mut Criterion) {
    let raw = players_json(&DemoFeed::new(26));
    c.bench_function("players_parse_300", |b| {
        b.iter(|| {
            let catalog = parse_players_json(black_box(&raw)).unwrap();
            black_box(catalog.players.len());
        })
    });
}

fn bench_gray_out_candidates(c: &mut Criterion) {
    let feed = DemoFeed::new(26);
    let xi = feed.best_xi().unwrap().players;
    // Ten members: every rule is live when scanning the catalog.
    let squad = Squad::apply_recommended(&xi[..10], None).unwrap();
    let players = feed.all_players();

    c.bench_function("can_add_full_catalog", |b| {
        b.iter(|| {
            let eligible = players
                .iter()
                .filter(|p| black_box(&squad).can_add(p))
                .count();
            black_box(eligible);
        })
    });
}

fn bench_filtered_players(c: &mut Criterion) {
    let feed = DemoFeed::new(26);
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetCatalog {
            source: "demo",
            catalog: feed.players().unwrap(),
        },
    );
    state.search = "a".to_string();

    c.bench_function("filtered_players_search", |b| {
        b.iter(|| {
            let rows = black_box(&state).filtered_players();
            black_box(rows.len());
        })
    });
}

criterion_group!(
    benches,
    bench_players_parse,
    bench_gray_out_candidates,
    bench_filtered_players
);
criterion_main!(benches);
