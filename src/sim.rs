//! Resolves one game into a final score and box score.
//!
//! Every player who takes the floor gets a line drawn from their ratings, position and role,
//! scaled by their minutes. Team scores are the sum of those lines, so the box score and the
//! final score can never disagree.

use crate::id::{GameId, PlayerId};
use crate::team::LineupSlot;
use crate::{
    AwayHome, BoxScore, Date, Error, Game, LeagueConfig, Player, PlayerGameStats, PlayoffSeries,
    Result, Rng, Team, TeamSelect, Tendencies,
};
use std::collections::BTreeMap;

// some consts, so we know what to tune when box scores drift
const OVERTIME_MINUTES: u8 = 5;
const OVERTIME_PLAYERS: usize = 5;
const MAX_OVERTIMES: u8 = 8;
const SHOTS_PER_MINUTE: f64 = 0.37;
const FREE_THROWS_PER_MINUTE: f64 = 0.09;
const REBOUNDS_PER_MINUTE: f64 = 0.18;
const OFFENSIVE_REBOUND_SHARE: f64 = 0.25;
const ASSISTED_SHARE: f64 = 0.6;
const HOME_EDGE: f64 = 0.012;
const FOUL_LIMIT: u32 = 6;

/// Plays a fresh game between `teams`.
///
/// With a series, home court follows the series pattern rather than the order of `teams`, and
/// the game is tagged with the series and its game number.
pub fn simulate(
    teams: AwayHome<&Team>,
    series: Option<&PlayoffSeries>,
    date: Date,
    config: &LeagueConfig,
    rng: &mut Rng,
) -> Result<Game> {
    let mut teams = teams;
    let mut game_number = 0;
    if let Some(series) = series {
        let (a, b) = (teams.home.id, teams.away.id);
        if !series.involves(a) || !series.involves(b) || a == b {
            return Err(Error::transition(format!(
                "{} vs {} is not the {} series",
                teams.away.full_name(),
                teams.home.full_name(),
                series.round
            )));
        }
        if series.is_complete() {
            return Err(Error::transition(format!(
                "{} series {} is already decided",
                series.round, series.id
            )));
        }
        game_number = series.games_played() + 1;
        if teams.home.id != series.home_for_game(game_number) {
            teams = teams.swap();
        }
    }

    let mut game = Game::new(
        GameId::generate(rng),
        date,
        AwayHome {
            away: teams.away.id,
            home: teams.home.id,
        },
    );
    game.series = series.map(|s| s.id);
    game.game_number = game_number;
    resolve(game, teams, config, rng)
}

/// Plays a game already on the schedule.
pub fn play_scheduled(
    game: Game,
    teams: AwayHome<&Team>,
    config: &LeagueConfig,
    rng: &mut Rng,
) -> Result<Game> {
    if game.played {
        return Err(Error::transition(format!("game {} was already played", game.id)));
    }
    if game.home_id() != teams.home.id || game.away_id() != teams.away.id {
        return Err(Error::transition(format!(
            "game {} is not {} at {}",
            game.id,
            teams.away.full_name(),
            teams.home.full_name()
        )));
    }
    resolve(game, teams, config, rng)
}

struct OnFloor<'a> {
    slot: LineupSlot,
    player: &'a Player,
    tendencies: Tendencies,
}

fn on_floor<'a>(team: &'a Team, config: &LeagueConfig) -> Result<Vec<OnFloor<'a>>> {
    team.lineup(config)?
        .into_iter()
        .map(|slot| {
            let player = team.player(slot.player_id)?;
            Ok(OnFloor {
                slot,
                player,
                tendencies: player.tendencies_at(slot.position),
            })
        })
        .collect()
}

/// Minutes-weighted defensive rating of a lineup, 0–100.
fn defense(players: &[OnFloor<'_>]) -> f64 {
    let mut total = 0.0;
    let mut minutes = 0.0;
    for p in players {
        let a = &p.player.attributes;
        let rating = (f64::from(a.perimeter_defense) + f64::from(a.interior_defense)) / 2.0;
        total += rating * f64::from(p.slot.minutes);
        minutes += f64::from(p.slot.minutes);
    }
    if minutes > 0.0 {
        total / minutes
    } else {
        50.0
    }
}

fn resolve(
    mut game: Game,
    teams: AwayHome<&Team>,
    config: &LeagueConfig,
    rng: &mut Rng,
) -> Result<Game> {
    let floor = AwayHome {
        away: on_floor(teams.away, config)?,
        home: on_floor(teams.home, config)?,
    };
    let defenses = AwayHome {
        away: defense(&floor.away),
        home: defense(&floor.home),
    };
    let mut lines: AwayHome<BTreeMap<PlayerId, PlayerGameStats>> = AwayHome::default();

    for side in TeamSelect::BOTH {
        let players = floor.select(side);
        let minutes = players.iter().map(|p| p.slot.minutes).collect::<Vec<_>>();
        let stretch = play_stretch(
            rng,
            players,
            &minutes,
            *defenses.select(side.other()),
            side == TeamSelect::Home,
        );
        merge(lines.select_mut(side), stretch);
    }

    while points(&lines.home) == points(&lines.away) {
        if game.overtimes == MAX_OVERTIMES {
            // Nobody has ever needed this many; break the tie at the line.
            break_tie(&mut lines.home, &floor.home);
            break;
        }
        game.overtimes += 1;
        for side in TeamSelect::BOTH {
            let players = floor.select(side);
            let minutes = overtime_minutes(players, lines.select(side));
            let stretch = play_stretch(
                rng,
                players,
                &minutes,
                *defenses.select(side.other()),
                side == TeamSelect::Home,
            );
            merge(lines.select_mut(side), stretch);
        }
    }

    for side in TeamSelect::BOTH {
        let team = game.teams.select_mut(side);
        let box_score = BoxScore(std::mem::take(lines.select_mut(side)));
        team.score = u16::try_from(box_score.points()).unwrap_or(u16::MAX);
        team.box_score = box_score;
    }
    game.played = true;

    log::debug!(
        "{} {} at {} {}{}",
        teams.away.name,
        game.teams.away.score,
        teams.home.name,
        game.teams.home.score,
        match game.overtimes {
            0 => String::new(),
            1 => " (OT)".to_string(),
            n => format!(" ({}OT)", n),
        }
    );
    Ok(game)
}

fn points(lines: &BTreeMap<PlayerId, PlayerGameStats>) -> u32 {
    lines.values().map(|l| l.points).sum()
}

fn merge(
    lines: &mut BTreeMap<PlayerId, PlayerGameStats>,
    stretch: Vec<(PlayerId, PlayerGameStats)>,
) {
    for (id, line) in stretch {
        let total = lines.entry(id).or_default();
        *total += &line;
        total.fouls = total.fouls.min(FOUL_LIMIT);
    }
}

/// The five heaviest-minute players still eligible go the whole overtime period.
fn overtime_minutes(
    players: &[OnFloor<'_>],
    lines: &BTreeMap<PlayerId, PlayerGameStats>,
) -> Vec<u8> {
    let fouled_out = |p: &OnFloor<'_>| {
        lines
            .get(&p.slot.player_id)
            .is_some_and(|line| line.fouls >= FOUL_LIMIT)
    };
    let mut order = (0..players.len())
        .filter(|i| !fouled_out(&players[*i]))
        .collect::<Vec<_>>();
    order.sort_by(|a, b| {
        players[*b]
            .slot
            .minutes
            .cmp(&players[*a].slot.minutes)
            .then(a.cmp(b))
    });
    let mut minutes = vec![0; players.len()];
    for idx in order.into_iter().take(OVERTIME_PLAYERS) {
        minutes[idx] = OVERTIME_MINUTES;
    }
    minutes
}

fn break_tie(lines: &mut BTreeMap<PlayerId, PlayerGameStats>, players: &[OnFloor<'_>]) {
    let shooter = players
        .iter()
        .max_by_key(|p| p.player.attributes.free_throw)
        .map(|p| p.slot.player_id);
    if let Some(line) = shooter.and_then(|id| lines.get_mut(&id)) {
        line.free_throws_attempted += 1;
        line.free_throws_made += 1;
        line.points += 1;
    }
}

/// Box-score lines for one stretch of play (regulation or an overtime period).
fn play_stretch(
    rng: &mut Rng,
    players: &[OnFloor<'_>],
    minutes: &[u8],
    opponent_defense: f64,
    home: bool,
) -> Vec<(PlayerId, PlayerGameStats)> {
    let edge = if home { HOME_EDGE } else { 0.0 };
    let mut lines = players
        .iter()
        .zip(minutes)
        .map(|(p, m)| (p.slot.player_id, produce(rng, p, *m, opponent_defense, edge)))
        .collect::<Vec<_>>();
    distribute_assists(rng, players, minutes, &mut lines);
    lines.retain(|(_, line)| line.minutes > 0);
    lines
}

fn produce(
    rng: &mut Rng,
    on: &OnFloor<'_>,
    minutes: u8,
    opponent_defense: f64,
    edge: f64,
) -> PlayerGameStats {
    if minutes == 0 {
        return PlayerGameStats::default();
    }
    let a = &on.player.attributes;
    let t = on.tendencies;
    let rating = |r: u8| f64::from(r) / 100.0;
    let chances = u32::from(minutes) * 2;
    let defense_drag = 0.08 * (opponent_defense - 50.0) / 50.0;

    let scoring = (rating(a.inside_scoring) + rating(a.mid_range) + rating(a.three_point)) / 3.0;
    let shot_rate = SHOTS_PER_MINUTE * t.shots * (0.75 + 0.5 * scoring);
    let field_goals_attempted = rng.binomial(chances, shot_rate / 2.0);

    let three_share = (t.three_share * (0.5 + rating(a.three_point))).clamp(0.0, 0.8);
    let threes_attempted = rng.binomial(field_goals_attempted, three_share);
    let twos_attempted = field_goals_attempted - threes_attempted;

    let two_pct = 0.40 + 0.17 * (0.6 * rating(a.inside_scoring) + 0.4 * rating(a.mid_range))
        - defense_drag
        + edge;
    let three_pct = 0.27 + 0.14 * rating(a.three_point) - 0.6 * defense_drag + edge;
    let threes_made = rng.binomial(threes_attempted, three_pct);
    let twos_made = rng.binomial(twos_attempted, two_pct);

    let ft_rate = FREE_THROWS_PER_MINUTE
        * (0.6 + 0.4 * rating(a.inside_scoring) + 0.4 * rating(a.athleticism));
    let free_throws_attempted = rng.binomial(chances, ft_rate / 2.0);
    let free_throws_made =
        rng.binomial(free_throws_attempted, 0.55 + 0.38 * rating(a.free_throw));

    let rebounds = rng.binomial(
        chances,
        REBOUNDS_PER_MINUTE * t.rebounds * (0.5 + rating(a.rebounding)) / 2.0,
    );
    let offensive_rebounds = rng.binomial(rebounds, OFFENSIVE_REBOUND_SHARE);

    let m = u32::from(minutes);
    let steals = rng.binomial(m, 0.02 * t.steals * (0.5 + rating(a.steal)));
    let blocks = rng.binomial(m, 0.012 * t.blocks * (0.4 + rating(a.block)));
    let turnovers = rng.binomial(m, 0.06 * t.shots * (1.3 - rating(a.ball_handling)));
    let fouls = rng.binomial(m, 0.05).min(FOUL_LIMIT);

    let field_goals_made = twos_made + threes_made;
    PlayerGameStats {
        minutes: m,
        points: 2 * twos_made + 3 * threes_made + free_throws_made,
        offensive_rebounds,
        defensive_rebounds: rebounds - offensive_rebounds,
        assists: 0,
        field_goals_made,
        field_goals_attempted,
        threes_made,
        threes_attempted,
        free_throws_made,
        free_throws_attempted,
        steals,
        blocks,
        turnovers,
        fouls,
    }
}

/// Credits a share of each made basket to a teammate, weighted by passing and minutes.
fn distribute_assists(
    rng: &mut Rng,
    players: &[OnFloor<'_>],
    minutes: &[u8],
    lines: &mut [(PlayerId, PlayerGameStats)],
) {
    let weights = players
        .iter()
        .zip(minutes)
        .map(|(p, m)| {
            f64::from(*m)
                * p.tendencies.assists
                * (0.3 + f64::from(p.player.attributes.passing) / 100.0)
        })
        .collect::<Vec<_>>();

    for shooter in 0..lines.len() {
        for _ in 0..lines[shooter].1.field_goals_made {
            if !rng.chance(ASSISTED_SHARE) {
                continue;
            }
            let total: f64 = weights
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != shooter)
                .map(|(_, w)| w)
                .sum();
            if total <= 0.0 {
                continue;
            }
            let mut pick = rng.next_f64() * total;
            for (i, w) in weights.iter().enumerate() {
                if i == shooter || *w <= 0.0 {
                    continue;
                }
                if pick < *w {
                    lines[i].1.assists += 1;
                    break;
                }
                pick -= w;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{merge, on_floor, overtime_minutes, play_scheduled, simulate};
    use crate::id::{GameId, SeriesId, TeamId};
    use crate::PlayerGameStats;
    use std::collections::BTreeMap;
    use crate::{
        AwayHome, Conference, Date, Error, Game, LeagueConfig, PlayoffSeries, Round, Rng, Team,
    };
    use proptest::prelude::*;

    fn team(rng: &mut Rng, name: &str) -> Team {
        Team::generate(
            rng,
            "Test".into(),
            name.into(),
            Conference::East,
            0,
            &LeagueConfig::default(),
        )
        .unwrap()
    }

    fn assert_sane(game: &Game, teams: AwayHome<&Team>) {
        assert!(game.played);
        assert_ne!(game.teams.home.score, game.teams.away.score);
        for (side, team) in [(&game.teams.home, teams.home), (&game.teams.away, teams.away)] {
            assert_eq!(u32::from(side.score), side.box_score.points());
            let lineup = team.lineup(&LeagueConfig::default()).unwrap();
            assert_eq!(side.box_score.len(), lineup.len());
            for (id, line) in side.box_score.iter() {
                assert!(team.has_player(*id));
                assert!(line.is_consistent(), "{:?}", line);
                assert!(line.minutes > 0);
                assert!(line.fouls <= 6);
            }
        }
    }

    #[test]
    fn regular_season_game() {
        let config = LeagueConfig::default();
        let mut rng = Rng::seeded(10, 20);
        let home = team(&mut rng, "Hosts");
        let away = team(&mut rng, "Guests");
        let teams = AwayHome {
            away: &away,
            home: &home,
        };
        let game = simulate(teams.clone(), None, Date::default(), &config, &mut rng).unwrap();
        assert_sane(&game, teams);
        assert_eq!(game.series, None);
        assert!(game.winner().is_some());
    }

    #[test]
    fn identical_teams_score_like_basketball() {
        let config = LeagueConfig::default();
        let mut rng = Rng::seeded(33, 44);
        let home = team(&mut rng, "Mirror");
        let mut away = home.clone();
        away.id = TeamId::new();
        let teams = AwayHome {
            away: &away,
            home: &home,
        };

        let mut total = 0.0;
        let games = 200;
        for _ in 0..games {
            let game = simulate(teams.clone(), None, Date::default(), &config, &mut rng).unwrap();
            assert!(game.teams.home.score > 0 && game.teams.away.score > 0);
            assert_ne!(game.teams.home.score, game.teams.away.score);
            total += f64::from(game.teams.home.score) + f64::from(game.teams.away.score);
        }
        let mean = total / f64::from(2 * games);
        assert!((90.0..=130.0).contains(&mean), "mean score {}", mean);
    }

    #[test]
    fn starters_only_when_rotation_is_missing() {
        let config = LeagueConfig::default();
        let mut rng = Rng::seeded(3, 30);
        let home = team(&mut rng, "Iron").without_rotation();
        let away = team(&mut rng, "Five");
        let teams = AwayHome {
            away: &away,
            home: &home,
        };
        let game = simulate(teams.clone(), None, Date::default(), &config, &mut rng).unwrap();
        assert_eq!(game.teams.home.box_score.len(), 5);
        assert_sane(&game, teams);
    }

    #[test]
    fn series_decides_home_court() {
        let mut rng = Rng::seeded(8, 8);
        let high = team(&mut rng, "High");
        let low = team(&mut rng, "Low");
        let mut series = PlayoffSeries::new(
            SeriesId::new(),
            Round::FirstRound,
            Some(Conference::East),
            high.id,
            low.id,
            4,
        );
        series.home_wins = 1;
        series.away_wins = 1;

        // game 3 belongs to the lower seed no matter how the caller orders the teams
        let game = simulate(
            AwayHome {
                away: &low,
                home: &high,
            },
            Some(&series),
            Date::default(),
            &LeagueConfig::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(game.home_id(), low.id);
        assert_eq!(game.series, Some(series.id));
        assert_eq!(game.game_number, 3);
    }

    #[test]
    fn series_rejects_outsiders() {
        let mut rng = Rng::seeded(8, 9);
        let a = team(&mut rng, "A");
        let b = team(&mut rng, "B");
        let c = team(&mut rng, "C");
        let series = PlayoffSeries::new(SeriesId::new(), Round::Finals, None, a.id, b.id, 4);
        let err = simulate(
            AwayHome { away: &c, home: &a },
            Some(&series),
            Date::default(),
            &LeagueConfig::default(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidStateTransition { .. }));
    }

    #[test]
    fn scheduled_games_play_once() {
        let config = LeagueConfig::default();
        let mut rng = Rng::seeded(12, 21);
        let home = team(&mut rng, "H");
        let away = team(&mut rng, "A");
        let teams = AwayHome {
            away: &away,
            home: &home,
        };
        let scheduled = Game::new(
            GameId::new(),
            Date::default(),
            AwayHome {
                away: away.id,
                home: home.id,
            },
        );
        let played = play_scheduled(scheduled.clone(), teams.clone(), &config, &mut rng).unwrap();
        assert_eq!(played.id, scheduled.id);
        assert_sane(&played, teams.clone());
        assert!(play_scheduled(played, teams.clone(), &config, &mut rng).is_err());
        assert!(play_scheduled(scheduled, teams.swap(), &config, &mut rng).is_err());
    }

    #[test]
    fn fouled_out_players_sit_out_overtime() {
        let mut rng = Rng::seeded(6, 6);
        let team = team(&mut rng, "Whistles");
        let floor = on_floor(&team, &LeagueConfig::default()).unwrap();

        let mut lines = BTreeMap::new();
        let fresh = overtime_minutes(&floor, &lines);
        let starter = fresh.iter().position(|m| *m > 0).unwrap();
        let id = floor[starter].slot.player_id;
        lines.insert(
            id,
            PlayerGameStats {
                minutes: 32,
                fouls: 6,
                ..PlayerGameStats::default()
            },
        );
        let minutes = overtime_minutes(&floor, &lines);
        assert_eq!(minutes[starter], 0);
        assert_eq!(minutes.iter().filter(|m| **m > 0).count(), 5);

        // fouls never pile up past the limit once periods are merged
        lines.insert(
            id,
            PlayerGameStats {
                minutes: 32,
                fouls: 5,
                ..PlayerGameStats::default()
            },
        );
        merge(
            &mut lines,
            vec![(
                id,
                PlayerGameStats {
                    minutes: 5,
                    fouls: 3,
                    ..PlayerGameStats::default()
                },
            )],
        );
        assert_eq!(lines[&id].fouls, 6);
        assert_eq!(lines[&id].minutes, 37);
    }

    #[test]
    fn short_games_without_rotation_play_the_configured_length() {
        let config = LeagueConfig {
            minutes_per_position: 40,
            ..LeagueConfig::default()
        };
        let mut rng = Rng::seeded(4, 40);
        let home = team(&mut rng, "Short").without_rotation();
        let away = team(&mut rng, "Bench");
        let game = simulate(
            AwayHome {
                away: &away,
                home: &home,
            },
            None,
            Date::default(),
            &config,
            &mut rng,
        )
        .unwrap();
        let longest = 40 + 5 * u32::from(game.overtimes);
        assert_eq!(game.teams.home.box_score.len(), 5);
        assert!(game
            .teams
            .home
            .box_score
            .values()
            .all(|line| (40..=longest).contains(&line.minutes)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn never_ties_and_never_makes_more_than_attempts(seed in any::<u64>()) {
            let mut rng = Rng::seeded(seed, seed ^ 0x5555);
            let home = team(&mut rng, "P");
            let away = team(&mut rng, "Q");
            let game = simulate(AwayHome { away: &away, home: &home }, None, Date::default(), &LeagueConfig::default(), &mut rng).unwrap();
            prop_assert_ne!(game.teams.home.score, game.teams.away.score);
            for side in [&game.teams.home, &game.teams.away] {
                for line in side.box_score.values() {
                    prop_assert!(line.field_goals_made <= line.field_goals_attempted);
                    prop_assert!(line.threes_made <= line.threes_attempted);
                    prop_assert!(line.free_throws_made <= line.free_throws_attempted);
                }
            }
        }
    }
}
