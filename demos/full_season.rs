use anyhow::Context;
use fs_err::File;
use hoopsim::{Conference, GameState, League, LeagueConfig, PlayerTotals, Rng, SeasonPhase};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(seed) => seed
            .parse::<u64>()
            .context("usage: cargo run --example full_season -- [SEED] [SAVE.JSON]")?,
        None => 2024,
    };
    let save = args.next();

    let config = LeagueConfig::default();
    let mut rng = Rng::seeded(seed, seed.rotate_left(32));
    let league = League::generate(&mut rng, &config)?;
    let user = league
        .teams()
        .next()
        .context("generated league has no teams")?
        .id;
    let state = GameState::new(rng, config, league, user, 2024)?;
    let user_name = state.league().team(user)?.full_name();

    let state = state.fast_forward(|s| s.phase == SeasonPhase::RegularSeason)?;
    let season = state.season();
    let standings = season.standings(state.league());
    for conference in Conference::ALL {
        println!("{}", conference);
        for (i, record) in standings.conference(conference).iter().enumerate() {
            println!(
                "  {:>2}. {:<24} {:>2}-{:<2}  {:.3}",
                i + 1,
                record.name,
                record.wins,
                record.losses,
                record.win_pct()
            );
        }
    }

    let state = state.fast_forward(|_| true)?;
    let season = state.season();
    if let Some(bracket) = &season.playoffs {
        for round in [
            bracket.play_in.as_slice(),
            bracket.first_round.as_slice(),
            bracket.conference_semifinals.as_slice(),
            bracket.conference_finals.as_slice(),
            bracket.finals.as_slice(),
        ] {
            for series in round {
                let name = |id| {
                    state
                        .league()
                        .team(id)
                        .map_or_else(|_| id.to_string(), |t| t.full_name())
                };
                println!(
                    "{:<22} {} {} - {} {}",
                    series.round.to_string(),
                    name(series.home_team_id),
                    series.home_wins,
                    series.away_wins,
                    name(series.away_team_id)
                );
            }
        }
    }
    if let Some(champion) = season.champion() {
        println!("champions: {}", state.league().team(champion)?.full_name());
    }

    let (wins, losses) = season.user_record();
    println!("\n{} went {}-{}", user_name, wins, losses);
    for totals in season
        .season_stats
        .leaders(PlayerTotals::points_per_game)
        .into_iter()
        .take(5)
    {
        let (_, player) = state.league().player(totals.player_id)?;
        println!(
            "  {:<28} {:>5.1} ppg {:>5.1} rpg {:>5.1} apg  TS {:.3}",
            player.name,
            totals.points_per_game(),
            totals.rebounds_per_game(),
            totals.assists_per_game(),
            totals.true_shooting_pct().unwrap_or_default()
        );
    }

    if let Some(path) = save {
        serde_json::to_writer(File::create(path)?, &state)?;
    }
    Ok(())
}
