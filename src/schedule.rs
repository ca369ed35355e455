//! Regular-season calendar.
//!
//! Every team plays `games_per_team` games. Each pair of teams meets a fixed number of times
//! depending on whether they share a division, a conference, or neither. Whatever those counts
//! leave over is filled with one extra meeting against a regular subset of opponents.

use crate::id::{GameId, TeamId};
use crate::{AwayHome, Conference, Date, Error, Game, LeagueConfig, Result, Rng, Team};
use std::collections::BTreeMap;

/// Builds the season's games, sorted by day. The same teams and seed always give the same
/// schedule, ids included.
pub fn generate<'a, I>(
    teams: I,
    user_team: TeamId,
    config: &LeagueConfig,
    rng: &mut Rng,
) -> Result<Vec<Game>>
where
    I: IntoIterator<Item = &'a Team>,
{
    let mut teams = teams.into_iter().collect::<Vec<_>>();
    teams.sort_by_key(|team| team.id);
    if teams.len() < 2 {
        return Err(Error::configuration(format!(
            "a schedule needs at least two teams, got {}",
            teams.len()
        )));
    }
    if !teams.iter().any(|team| team.id == user_team) {
        return Err(Error::MissingTeam(user_team));
    }

    let layout = Layout::new(&teams)?;
    let plan = Plan::search(&layout, config.games_per_team)?;
    let pairings = layout.pairings(&plan);
    let mut matchups = orient(teams.len(), &pairings);
    rng.shuffle(&mut matchups);
    let days = pack(teams.len(), matchups);

    let mut games = Vec::new();
    for (day, matchups) in days.into_iter().enumerate() {
        let day = u16::try_from(day)
            .map_err(|_| Error::configuration("season runs longer than a calendar allows"))?;
        for (home, away) in matchups {
            games.push(Game::new(
                GameId::generate(rng),
                Date { season: 0, day },
                AwayHome {
                    away: teams[away].id,
                    home: teams[home].id,
                },
            ));
        }
    }

    log::info!(
        "schedule built: {} games over {} days, opponents met {}/{}/{} times (division/conference/other){}",
        games.len(),
        games.last().map_or(0, |g| g.date.day + 1),
        plan.division,
        plan.conference,
        plan.other,
        match &plan.extras {
            Extras::None => String::new(),
            Extras::Conference(offsets) => format!(", plus {} extra conference games", offsets.len() * (layout.divisions - 1)),
            Extras::Other(offsets) => format!(", plus {} extra interconference games", offsets.len()),
        }
    );
    Ok(games)
}

/// Where a team sits in the league: conference, division and slot within the division, all as
/// dense indices.
#[derive(Debug, Clone, Copy)]
struct Spot {
    conference: usize,
    division: usize,
    slot: usize,
}

#[derive(Debug)]
struct Layout {
    spots: Vec<Spot>,
    conferences: usize,
    /// Divisions per conference.
    divisions: usize,
    /// Teams per division.
    division_size: usize,
}

impl Layout {
    fn new(teams: &[&Team]) -> Result<Layout> {
        let mut grouped: BTreeMap<Conference, BTreeMap<u8, Vec<usize>>> = BTreeMap::new();
        for (index, team) in teams.iter().enumerate() {
            grouped
                .entry(team.conference)
                .or_default()
                .entry(team.division)
                .or_default()
                .push(index);
        }

        let divisions = grouped.values().map(BTreeMap::len).collect::<Vec<_>>();
        let sizes = grouped
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .collect::<Vec<_>>();
        if divisions.windows(2).any(|w| w[0] != w[1]) || sizes.windows(2).any(|w| w[0] != w[1]) {
            return Err(Error::configuration(format!(
                "conferences and divisions must be the same size (divisions per conference {:?}, teams per division {:?})",
                divisions, sizes
            )));
        }
        let division_size = sizes[0];
        if division_size < 2 {
            return Err(Error::configuration(
                "every team needs at least one division rival",
            ));
        }

        let mut spots = vec![
            Spot {
                conference: 0,
                division: 0,
                slot: 0,
            };
            teams.len()
        ];
        for (conference, divisions) in grouped.values().enumerate() {
            for (division, members) in divisions.values().enumerate() {
                for (slot, index) in members.iter().enumerate() {
                    spots[*index] = Spot {
                        conference,
                        division,
                        slot,
                    };
                }
            }
        }

        Ok(Layout {
            spots,
            conferences: grouped.len(),
            divisions: divisions[0],
            division_size,
        })
    }

    /// Opponents per team: division rivals, other conference teams, other conference's teams.
    fn opponents(&self) -> (u32, u32, u32) {
        let k = self.division_size;
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        (
            count(k - 1),
            count((self.divisions - 1) * k),
            count((self.conferences - 1) * self.divisions * k),
        )
    }

    /// How `remainder` games can be added as one extra meeting each, if at all.
    fn extras(&self, remainder: u32, plan: &Plan) -> Option<Extras> {
        if remainder == 0 {
            return Some(Extras::None);
        }
        let (_, conference, other) = self.opponents();
        let remainder = usize::try_from(remainder).ok()?;
        let k = self.division_size;

        // one extra game against `t` teams in each other division of the conference
        if conference > 0 && remainder % (self.divisions - 1) == 0 {
            let t = remainder / (self.divisions - 1);
            if t < k && plan.conference + 1 < plan.division {
                return Some(Extras::Conference(symmetric_offsets(k, t)));
            }
        }

        // one extra game against `remainder` teams of the other conference
        let n = self.divisions * k;
        if other > 0
            && remainder < n
            && plan.other + 1 < plan.division
            && (conference == 0 || plan.other < plan.conference)
        {
            return Some(Extras::Other((0..remainder).collect()));
        }
        None
    }

    fn pairings(&self, plan: &Plan) -> Vec<(usize, usize, u16)> {
        let k = self.division_size;
        let n = self.divisions * k;
        let mut pairings = Vec::new();
        for a in 0..self.spots.len() {
            for b in a + 1..self.spots.len() {
                let (sa, sb) = (self.spots[a], self.spots[b]);
                let count = if sa.conference == sb.conference {
                    if sa.division == sb.division {
                        plan.division
                    } else {
                        let extra = match &plan.extras {
                            Extras::Conference(offsets) => offsets.contains(&((sb.slot + k - sa.slot) % k)),
                            _ => false,
                        };
                        plan.conference + u16::from(extra)
                    }
                } else {
                    let (first, second) = if sa.conference < sb.conference {
                        (sa, sb)
                    } else {
                        (sb, sa)
                    };
                    let p = first.division * k + first.slot;
                    let q = second.division * k + second.slot;
                    let extra = match &plan.extras {
                        Extras::Other(offsets) => offsets.contains(&((q + n - p) % n)),
                        _ => false,
                    };
                    plan.other + u16::from(extra)
                };
                if count > 0 {
                    pairings.push((a, b, count));
                }
            }
        }
        pairings
    }
}

/// A set of `t` offsets in `0..k` closed under negation mod `k`, so "b is an extra opponent of
/// a" is symmetric. Requires `t < k`.
fn symmetric_offsets(k: usize, t: usize) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(t);
    if t % 2 == 1 {
        offsets.push(0);
    }
    let mut s = 1;
    while offsets.len() < t {
        offsets.push(s);
        offsets.push(k - s);
        s += 1;
    }
    offsets
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Extras {
    None,
    /// Slot offsets within each other division.
    Conference(Vec<usize>),
    /// Offsets into the other conference.
    Other(Vec<usize>),
}

/// Meetings per opponent of each kind.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Plan {
    division: u16,
    conference: u16,
    other: u16,
    extras: Extras,
}

impl Plan {
    /// Smallest gap between division and least-played opponents, then smallest remainder.
    fn search(layout: &Layout, games: u16) -> Result<Plan> {
        let (d, c, o) = layout.opponents();
        let total = u32::from(games);
        let mut best: Option<((u32, u32), Plan)> = None;

        for nd in 1..=total / d {
            let nc_max = if c > 0 { nd - 1 } else { 0 };
            for nc in 0..=nc_max {
                let no_max = match (c, o) {
                    (_, 0) => 0,
                    (0, _) => nd - 1,
                    _ => nc,
                };
                for no in 0..=no_max {
                    let base = nd * d + nc * c + no * o;
                    if base > total {
                        break;
                    }
                    let mut plan = Plan {
                        division: u16::try_from(nd).unwrap_or(u16::MAX),
                        conference: u16::try_from(nc).unwrap_or(u16::MAX),
                        other: u16::try_from(no).unwrap_or(u16::MAX),
                        extras: Extras::None,
                    };
                    let Some(extras) = layout.extras(total - base, &plan) else {
                        continue;
                    };
                    plan.extras = extras;
                    let least = if o > 0 {
                        no
                    } else if c > 0 {
                        nc
                    } else {
                        nd
                    };
                    let key = (nd - least, total - base);
                    if best.as_ref().map_or(true, |(k, _)| key < *k) {
                        best = Some((key, plan));
                    }
                }
            }
        }

        best.map(|(_, plan)| plan).ok_or_else(|| {
            Error::configuration(format!(
                "{} games per team cannot be split over {} division, {} conference and {} other opponents",
                games, d, c, o
            ))
        })
    }
}

/// Expands pairings into (home, away) games. Even series split evenly; the odd game of each
/// pairing is oriented along closed trails so every team's home and away counts differ by at
/// most one.
fn orient(teams: usize, pairings: &[(usize, usize, u16)]) -> Vec<(usize, usize)> {
    let mut games = Vec::new();
    let mut odd = Vec::new();
    for &(a, b, count) in pairings {
        for _ in 0..count / 2 {
            games.push((a, b));
            games.push((b, a));
        }
        if count % 2 == 1 {
            odd.push((a, b));
        }
    }

    // a dummy vertex evens out every degree, so closed trails cover all edges
    let dummy = teams;
    let mut degree = vec![0_usize; teams + 1];
    for (a, b) in &odd {
        degree[*a] += 1;
        degree[*b] += 1;
    }
    for (team, degree) in degree.iter().enumerate().take(teams) {
        if degree % 2 == 1 {
            odd.push((team, dummy));
        }
    }

    let mut adjacency = vec![Vec::new(); teams + 1];
    for (edge, (a, b)) in odd.iter().enumerate() {
        adjacency[*a].push(edge);
        adjacency[*b].push(edge);
    }
    let mut used = vec![false; odd.len()];
    let mut cursor = vec![0_usize; teams + 1];

    for start in 0..=teams {
        // with every degree even, a walk can only get stuck where it started
        let mut at = start;
        while let Some(edge) = next_unused(&adjacency[at], &mut cursor[at], &used) {
            used[edge] = true;
            let (a, b) = odd[edge];
            let to = if a == at { b } else { a };
            if at != dummy && to != dummy {
                games.push((to, at));
            }
            at = to;
        }
    }
    games
}

fn next_unused(edges: &[usize], cursor: &mut usize, used: &[bool]) -> Option<usize> {
    while let Some(edge) = edges.get(*cursor) {
        if !used[*edge] {
            return Some(*edge);
        }
        *cursor += 1;
    }
    None
}

/// Greedily fills each day with games whose teams are both free, keeping the shuffled order.
fn pack(teams: usize, mut remaining: Vec<(usize, usize)>) -> Vec<Vec<(usize, usize)>> {
    let mut days = Vec::new();
    while !remaining.is_empty() {
        let mut busy = vec![false; teams];
        let mut today = Vec::new();
        let mut later = Vec::new();
        for (home, away) in remaining {
            if busy[home] || busy[away] {
                later.push((home, away));
            } else {
                busy[home] = true;
                busy[away] = true;
                today.push((home, away));
            }
        }
        days.push(today);
        remaining = later;
    }
    days
}

#[cfg(test)]
mod tests {
    use super::{generate, symmetric_offsets};
    use crate::id::TeamId;
    use crate::{Conference, Error, Game, League, LeagueConfig, Rng, Team};
    use std::collections::{BTreeMap, BTreeSet};

    fn league() -> League {
        League::generate(&mut Rng::seeded(21, 12), &LeagueConfig::default()).unwrap()
    }

    fn bare_teams(layout: &[(Conference, u8, usize)]) -> Vec<Team> {
        let mut teams = Vec::new();
        for (conference, division, count) in layout {
            for i in 0..*count {
                teams.push(Team::new(
                    TeamId::new(),
                    format!("{}{}", conference, division),
                    format!("Team {}", i),
                    *conference,
                    *division,
                ));
            }
        }
        teams
    }

    fn meetings(games: &[Game]) -> BTreeMap<(TeamId, TeamId), u32> {
        let mut counts = BTreeMap::new();
        for game in games {
            let key = (game.home_id().min(game.away_id()), game.home_id().max(game.away_id()));
            *counts.entry(key).or_default() += 1;
        }
        counts
    }

    fn schedule(league: &League, config: &LeagueConfig, seed: u64) -> Vec<Game> {
        let user = league.teams().next().unwrap().id;
        generate(league.teams(), user, config, &mut Rng::seeded(seed, 7)).unwrap()
    }

    #[test]
    fn same_seed_same_schedule() {
        let league = league();
        let config = LeagueConfig::default();
        assert_eq!(schedule(&league, &config, 3), schedule(&league, &config, 3));
        assert_ne!(schedule(&league, &config, 3), schedule(&league, &config, 4));
    }

    #[test]
    fn every_team_plays_a_full_balanced_season() {
        let league = league();
        let games = schedule(&league, &LeagueConfig::default(), 5);
        assert_eq!(games.len(), 30 * 82 / 2);
        for team in league.teams() {
            let home = games.iter().filter(|g| g.home_id() == team.id).count();
            let away = games.iter().filter(|g| g.away_id() == team.id).count();
            assert_eq!(home + away, 82, "{}", team.full_name());
            assert!(home.abs_diff(away) <= 1, "{} home {} away {}", team.full_name(), home, away);
        }
        let ids = games.iter().map(|g| g.id).collect::<BTreeSet<_>>();
        assert_eq!(ids.len(), games.len());
    }

    #[test]
    fn division_rivals_meet_most() {
        let league = league();
        let games = schedule(&league, &LeagueConfig::default(), 6);
        let meetings = meetings(&games);
        let teams = league.teams().collect::<Vec<_>>();
        for a in &teams {
            let mut division = Vec::new();
            let mut conference = Vec::new();
            let mut other = Vec::new();
            for b in &teams {
                if a.id == b.id {
                    continue;
                }
                let n = meetings
                    .get(&(a.id.min(b.id), a.id.max(b.id)))
                    .copied()
                    .unwrap_or(0);
                if a.conference != b.conference {
                    other.push(n);
                } else if a.division == b.division {
                    division.push(n);
                } else {
                    conference.push(n);
                }
            }
            let least_division = division.iter().min().unwrap();
            let most_conference = conference.iter().max().unwrap();
            let most_other = other.iter().max().unwrap();
            assert!(least_division > most_conference);
            assert!(least_division > most_other);
            assert!(conference.iter().min().unwrap() >= most_other);
        }
    }

    #[test]
    fn nobody_plays_twice_in_a_day() {
        let league = league();
        let games = schedule(&league, &LeagueConfig::default(), 8);
        assert!(games.windows(2).all(|w| w[0].date <= w[1].date));
        let mut seen = BTreeSet::new();
        for game in &games {
            assert!(seen.insert((game.date.day, game.home_id())));
            assert!(seen.insert((game.date.day, game.away_id())));
        }
    }

    #[test]
    fn short_seasons_still_balance() {
        let league = league();
        let config = LeagueConfig {
            games_per_team: 20,
            ..LeagueConfig::default()
        };
        let games = schedule(&league, &config, 9);
        for team in league.teams() {
            assert_eq!(games.iter().filter(|g| g.involves(team.id)).count(), 20);
        }
    }

    #[test]
    fn uneven_conferences_are_rejected() {
        let teams = bare_teams(&[(Conference::East, 0, 4), (Conference::West, 0, 3)]);
        let err = generate(&teams, teams[0].id, &LeagueConfig::default(), &mut Rng::seeded(1, 1))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn impossible_game_counts_are_rejected() {
        // three division rivals and nobody else cannot share an odd number of games
        let teams = bare_teams(&[(Conference::East, 0, 4)]);
        let config = LeagueConfig {
            games_per_team: 7,
            ..LeagueConfig::default()
        };
        assert!(matches!(
            generate(&teams, teams[0].id, &config, &mut Rng::seeded(1, 1)),
            Err(Error::Configuration { .. })
        ));
        assert!(generate(&teams[..1], teams[0].id, &config, &mut Rng::seeded(1, 1)).is_err());
    }

    #[test]
    fn user_team_must_exist() {
        let teams = bare_teams(&[(Conference::East, 0, 2), (Conference::West, 0, 2)]);
        let stranger = TeamId::new();
        assert!(matches!(
            generate(&teams, stranger, &LeagueConfig::default(), &mut Rng::seeded(1, 1)),
            Err(Error::MissingTeam(id)) if id == stranger
        ));
    }

    #[test]
    fn tiny_leagues_use_extra_games() {
        let teams = bare_teams(&[(Conference::East, 0, 2), (Conference::West, 0, 2)]);
        let config = LeagueConfig {
            games_per_team: 6,
            ..LeagueConfig::default()
        };
        let games = generate(&teams, teams[0].id, &config, &mut Rng::seeded(2, 2)).unwrap();
        assert_eq!(games.len(), 12);
        for team in &teams {
            assert_eq!(games.iter().filter(|g| g.involves(team.id)).count(), 6);
        }
    }

    #[test]
    fn offsets_are_closed_under_negation() {
        for k in 2..8 {
            for t in 1..k {
                let offsets = symmetric_offsets(k, t);
                assert_eq!(offsets.len(), t);
                let set = offsets.iter().copied().collect::<BTreeSet<_>>();
                assert_eq!(set.len(), t);
                assert!(set.iter().all(|s| *s < k && set.contains(&((k - s) % k))));
            }
        }
    }
}
