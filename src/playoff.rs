//! Playoff seeding and the bracket state machine.
//!
//! A bracket only ever moves forward through [`Round`]: play-in, first round, conference
//! semifinals, conference finals, finals, complete. Series are value types; recording a result
//! hands back a new series (or bracket) rather than mutating a shared one.

use crate::id::{SeasonId, SeriesId, TeamId};
use crate::standings::{Standings, TeamRecord};
use crate::util::Ordinal;
use crate::{Conference, Error, Game, PlayoffConfig, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Round {
    PlayIn,
    FirstRound,
    ConferenceSemifinals,
    ConferenceFinals,
    Finals,
    Complete,
}

impl Round {
    pub fn next(self) -> Round {
        match self {
            Round::PlayIn => Round::FirstRound,
            Round::FirstRound => Round::ConferenceSemifinals,
            Round::ConferenceSemifinals => Round::ConferenceFinals,
            Round::ConferenceFinals => Round::Finals,
            Round::Finals | Round::Complete => Round::Complete,
        }
    }
}

impl Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Round::PlayIn => "play-in",
            Round::FirstRound => "first round",
            Round::ConferenceSemifinals => "conference semifinals",
            Round::ConferenceFinals => "conference finals",
            Round::Finals => "finals",
            Round::Complete => "complete",
        })
    }
}

/// Which play-in game a series is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum PlayInGame {
    /// 7 v 8; the winner takes the 7 seed.
    SevenEight,
    /// 9 v 10; the loser is out.
    NineTen,
    /// Loser of 7 v 8 hosts the winner of 9 v 10 for the 8 seed.
    Decider,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlayoffSeries {
    pub id: SeriesId,
    pub round: Round,
    /// `None` for the finals.
    pub conference: Option<Conference>,
    /// The team with home court.
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_wins: u8,
    pub away_wins: u8,
    pub wins_needed: u8,
    pub winner: Option<TeamId>,
    pub play_in: Option<PlayInGame>,
}

impl PlayoffSeries {
    pub fn new(
        id: SeriesId,
        round: Round,
        conference: Option<Conference>,
        home_team_id: TeamId,
        away_team_id: TeamId,
        wins_needed: u8,
    ) -> PlayoffSeries {
        PlayoffSeries {
            id,
            round,
            conference,
            home_team_id,
            away_team_id,
            home_wins: 0,
            away_wins: 0,
            wins_needed,
            winner: None,
            play_in: None,
        }
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.home_team_id == team || self.away_team_id == team
    }

    pub fn is_complete(&self) -> bool {
        self.winner.is_some()
    }

    pub fn games_played(&self) -> u8 {
        self.home_wins + self.away_wins
    }

    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner?;
        Some(if winner == self.home_team_id {
            self.away_team_id
        } else {
            self.home_team_id
        })
    }

    /// 2-2-1-1-1: games 3, 4 and 6 are at the lower seed, the rest at the higher seed.
    pub fn home_for_game(&self, game_number: u8) -> TeamId {
        match game_number {
            3 | 4 | 6 => self.away_team_id,
            _ => self.home_team_id,
        }
    }

    /// Credits the game's winner. The series is decided exactly when a side reaches
    /// `wins_needed`, and a decided series accepts no more games.
    pub fn with_result(&self, game: &Game) -> Result<PlayoffSeries> {
        if self.is_complete() {
            return Err(Error::transition(format!(
                "{} series {} is already decided",
                self.round, self.id
            )));
        }
        if game.series.is_some_and(|id| id != self.id)
            || !self.involves(game.home_id())
            || !self.involves(game.away_id())
        {
            return Err(Error::transition(format!(
                "game {} does not belong to series {}",
                game.id, self.id
            )));
        }
        let winner = game
            .winner()
            .ok_or_else(|| Error::transition(format!("game {} has no result", game.id)))?;

        let mut next = self.clone();
        if winner == next.home_team_id {
            next.home_wins += 1;
            if next.home_wins >= next.wins_needed {
                next.winner = Some(winner);
            }
        } else {
            next.away_wins += 1;
            if next.away_wins >= next.wins_needed {
                next.winner = Some(winner);
            }
        }
        Ok(next)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayoffBracket {
    pub season_id: SeasonId,
    pub config: PlayoffConfig,
    /// Seeds of the teams still in (or finished in) the main bracket, per conference.
    pub seeds: BTreeMap<TeamId, u8>,
    pub conferences: BTreeMap<TeamId, Conference>,
    pub records: BTreeMap<TeamId, TeamRecord>,
    pub play_in: Vec<PlayoffSeries>,
    pub first_round: Vec<PlayoffSeries>,
    pub conference_semifinals: Vec<PlayoffSeries>,
    pub conference_finals: Vec<PlayoffSeries>,
    pub finals: Option<PlayoffSeries>,
    /// Teams that skip the current round.
    pub byes: Vec<TeamId>,
    pub current_round: Round,
    pub champion: Option<TeamId>,
    series_counter: u32,
}

impl PlayoffBracket {
    /// Seeds each conference from the standings and sets up the opening round.
    pub fn seed(
        season_id: SeasonId,
        standings: &Standings,
        config: &PlayoffConfig,
    ) -> Result<PlayoffBracket> {
        let mut bracket = PlayoffBracket {
            season_id,
            config: config.clone(),
            seeds: BTreeMap::new(),
            conferences: BTreeMap::new(),
            records: BTreeMap::new(),
            play_in: Vec::new(),
            first_round: Vec::new(),
            conference_semifinals: Vec::new(),
            conference_finals: Vec::new(),
            finals: None,
            byes: Vec::new(),
            current_round: Round::FirstRound,
            champion: None,
            series_counter: 0,
        };

        let direct = usize::from(config.direct_seeds);
        let mut play_in_pairs = Vec::new();
        for conference in Conference::ALL {
            let table = standings.conference(conference);
            if table.is_empty() {
                continue;
            }
            let with_play_in = config.play_in && table.len() >= direct + 4;
            let qualifiers = if with_play_in {
                direct + 4
            } else {
                table.len().min(config.bracket_size())
            };

            for (i, record) in table.into_iter().take(qualifiers).enumerate() {
                let seed = u8::try_from(i + 1).unwrap_or(u8::MAX);
                bracket.seeds.insert(record.team_id, seed);
                bracket.conferences.insert(record.team_id, conference);
                bracket.records.insert(record.team_id, record.clone());
                log::debug!("{} seed in the {}: {}", Ordinal(seed), conference, record.name);
            }
            if with_play_in {
                play_in_pairs.push(conference);
            }
        }

        if bracket.seeds.len() < 2 {
            return Err(Error::configuration(format!(
                "{} team(s) qualified, a bracket needs two",
                bracket.seeds.len()
            )));
        }

        if play_in_pairs.is_empty() {
            bracket.open_first_round();
        } else {
            bracket.current_round = Round::PlayIn;
            for conference in play_in_pairs {
                let seeded = |seed: usize| -> Result<TeamId> {
                    bracket
                        .team_with_seed(conference, u8::try_from(seed).unwrap_or(u8::MAX))
                        .ok_or_else(|| Error::configuration(format!("no {} seed", seed)))
                };
                let (seven, eight) = (seeded(direct + 1)?, seeded(direct + 2)?);
                let (nine, ten) = (seeded(direct + 3)?, seeded(direct + 4)?);
                let first = bracket.new_series(Round::PlayIn, Some(conference), seven, eight);
                let second = bracket.new_series(Round::PlayIn, Some(conference), nine, ten);
                bracket.play_in.push(PlayoffSeries {
                    play_in: Some(PlayInGame::SevenEight),
                    ..first
                });
                bracket.play_in.push(PlayoffSeries {
                    play_in: Some(PlayInGame::NineTen),
                    ..second
                });
            }
        }

        log::info!(
            "playoffs seeded with {} teams, opening with the {}",
            bracket.seeds.len(),
            bracket.current_round
        );
        Ok(bracket)
    }

    fn team_with_seed(&self, conference: Conference, seed: u8) -> Option<TeamId> {
        self.seeds
            .iter()
            .find(|(team, s)| **s == seed && self.conferences.get(team) == Some(&conference))
            .map(|(team, _)| *team)
    }

    fn next_series_id(&mut self) -> SeriesId {
        self.series_counter += 1;
        let mut bytes = *self.season_id.0.as_bytes();
        bytes[12..].copy_from_slice(&self.series_counter.to_be_bytes());
        SeriesId(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    fn new_series(
        &mut self,
        round: Round,
        conference: Option<Conference>,
        home: TeamId,
        away: TeamId,
    ) -> PlayoffSeries {
        let id = self.next_series_id();
        PlayoffSeries::new(
            id,
            round,
            conference,
            home,
            away,
            self.config.wins_needed(round),
        )
    }

    pub fn round_series(&self, round: Round) -> &[PlayoffSeries] {
        match round {
            Round::PlayIn => &self.play_in,
            Round::FirstRound => &self.first_round,
            Round::ConferenceSemifinals => &self.conference_semifinals,
            Round::ConferenceFinals => &self.conference_finals,
            Round::Finals => match &self.finals {
                Some(series) => std::slice::from_ref(series),
                None => &[],
            },
            Round::Complete => &[],
        }
    }

    fn round_series_mut(&mut self, round: Round) -> &mut [PlayoffSeries] {
        match round {
            Round::PlayIn => &mut self.play_in,
            Round::FirstRound => &mut self.first_round,
            Round::ConferenceSemifinals => &mut self.conference_semifinals,
            Round::ConferenceFinals => &mut self.conference_finals,
            Round::Finals => match &mut self.finals {
                Some(series) => std::slice::from_mut(series),
                None => &mut [],
            },
            Round::Complete => &mut [],
        }
    }

    pub fn current_series(&self) -> &[PlayoffSeries] {
        self.round_series(self.current_round)
    }

    /// The current-round series the team is in, preferring one still being played.
    pub fn user_team_series(&self, team: TeamId) -> Option<&PlayoffSeries> {
        let series = self.current_series();
        series
            .iter()
            .find(|s| s.involves(team) && !s.is_complete())
            .or_else(|| series.iter().find(|s| s.involves(team)))
    }

    /// First undecided series of the current round, in bracket order.
    pub fn next_open_series(&self) -> Option<&PlayoffSeries> {
        self.current_series().iter().find(|s| !s.is_complete())
    }

    pub fn is_eliminated(&self, team: TeamId) -> bool {
        if self.champion.is_some_and(|c| c != team) {
            return true;
        }
        let lost = |s: &PlayoffSeries| s.loser() == Some(team);
        // losing the 7 v 8 play-in game only sends a team to the decider
        self.play_in
            .iter()
            .filter(|s| s.play_in != Some(PlayInGame::SevenEight))
            .any(lost)
            || self.first_round.iter().any(lost)
            || self.conference_semifinals.iter().any(lost)
            || self.conference_finals.iter().any(lost)
            || self.finals.iter().any(lost)
    }

    /// Applies a played game to its current-round series.
    pub fn record_result(mut self, game: &Game) -> Result<PlayoffBracket> {
        let round = self.current_round;
        let slot = self
            .round_series(round)
            .iter()
            .position(|s| match game.series {
                Some(id) => s.id == id,
                None => !s.is_complete() && s.involves(game.home_id()) && s.involves(game.away_id()),
            })
            .ok_or_else(|| {
                Error::transition(format!(
                    "game {} belongs to no series in the {}",
                    game.id, round
                ))
            })?;

        let updated = self.round_series(round)[slot].with_result(game)?;
        if let Some(winner) = updated.winner {
            log::info!(
                "{} series {} won {}-{} by {}",
                round,
                updated.id,
                updated.home_wins.max(updated.away_wins),
                updated.home_wins.min(updated.away_wins),
                self.records
                    .get(&winner)
                    .map_or_else(|| winner.to_string(), |r| r.name.clone())
            );
        }
        self.round_series_mut(round)[slot] = updated;

        if round == Round::PlayIn {
            self.schedule_play_in_deciders();
        }
        Ok(self)
    }

    fn play_in_game(&self, conference: Conference, which: PlayInGame) -> Option<&PlayoffSeries> {
        self.play_in
            .iter()
            .find(|s| s.conference == Some(conference) && s.play_in == Some(which))
    }

    fn play_in_conferences(&self) -> Vec<Conference> {
        Conference::ALL
            .into_iter()
            .filter(|c| self.play_in_game(*c, PlayInGame::SevenEight).is_some())
            .collect()
    }

    fn schedule_play_in_deciders(&mut self) {
        for conference in self.play_in_conferences() {
            if self.play_in_game(conference, PlayInGame::Decider).is_some() {
                continue;
            }
            let first = self
                .play_in_game(conference, PlayInGame::SevenEight)
                .and_then(PlayoffSeries::loser);
            let second = self
                .play_in_game(conference, PlayInGame::NineTen)
                .and_then(|s| s.winner);
            if let (Some(home), Some(away)) = (first, second) {
                let series = self.new_series(Round::PlayIn, Some(conference), home, away);
                self.play_in.push(PlayoffSeries {
                    play_in: Some(PlayInGame::Decider),
                    ..series
                });
            }
        }
    }

    /// Every current-round series has a winner; the play-in also needs its deciders played.
    pub fn is_round_complete(&self) -> bool {
        if self.current_round == Round::Complete {
            return true;
        }
        if self.current_round == Round::PlayIn
            && self
                .play_in_conferences()
                .into_iter()
                .any(|c| self.play_in_game(c, PlayInGame::Decider).is_none())
        {
            return false;
        }
        self.current_series().iter().all(PlayoffSeries::is_complete)
    }

    /// Moves to the next round once the current one is complete. Calling this early leaves the
    /// bracket untouched.
    pub fn advance_round(mut self) -> PlayoffBracket {
        if self.current_round == Round::Complete {
            return self;
        }
        if !self.is_round_complete() {
            log::debug!(
                "{} is still being played, bracket not advanced",
                self.current_round
            );
            return self;
        }

        match self.current_round {
            Round::PlayIn => {
                self.resolve_play_in();
                self.open_first_round();
            }
            Round::FirstRound | Round::ConferenceSemifinals => {
                let next = self.current_round.next();
                let field = self.survivors();
                self.byes.clear();
                for (conference, teams) in field {
                    self.pair_conference(next, conference, teams);
                }
                self.current_round = next;
            }
            Round::ConferenceFinals => {
                let champions = self
                    .survivors()
                    .into_values()
                    .flatten()
                    .collect::<Vec<_>>();
                self.byes.clear();
                if let [a, b] = champions[..] {
                    let (home, away) = if self.finals_order(a, b).is_le() {
                        (a, b)
                    } else {
                        (b, a)
                    };
                    self.finals = Some(self.new_series(Round::Finals, None, home, away));
                } else {
                    // a single conference has its champion already
                    self.byes = champions;
                }
                self.current_round = Round::Finals;
            }
            Round::Finals => {
                self.champion = self
                    .finals
                    .as_ref()
                    .and_then(|s| s.winner)
                    .or_else(|| self.byes.first().copied());
                self.byes.clear();
                self.current_round = Round::Complete;
                if let Some(champion) = self.champion {
                    log::info!(
                        "{} are champions",
                        self.records
                            .get(&champion)
                            .map_or_else(|| champion.to_string(), |r| r.name.clone())
                    );
                }
            }
            Round::Complete => {}
        }

        log::info!("playoffs advanced to the {}", self.current_round);
        self
    }

    /// Winners of the current round plus teams that had a bye, grouped by conference.
    fn survivors(&self) -> BTreeMap<Conference, Vec<TeamId>> {
        let mut field: BTreeMap<Conference, Vec<TeamId>> = BTreeMap::new();
        let winners = self.current_series().iter().filter_map(|s| s.winner);
        for team in winners.chain(self.byes.iter().copied()) {
            if let Some(conference) = self.conferences.get(&team) {
                field.entry(*conference).or_default().push(team);
            }
        }
        field
    }

    /// The 7 v 8 winner takes the 7 seed, the decider winner the 8 seed; the rest go home.
    fn resolve_play_in(&mut self) {
        let direct = self.config.direct_seeds;
        for conference in self.play_in_conferences() {
            let seventh = self
                .play_in_game(conference, PlayInGame::SevenEight)
                .and_then(|s| s.winner);
            let eighth = self
                .play_in_game(conference, PlayInGame::Decider)
                .and_then(|s| s.winner);
            let out = self
                .play_in
                .iter()
                .filter(|s| s.conference == Some(conference))
                .filter(|s| s.play_in != Some(PlayInGame::SevenEight))
                .filter_map(PlayoffSeries::loser)
                .collect::<Vec<_>>();
            for team in out {
                self.seeds.remove(&team);
            }
            if let Some(team) = seventh {
                self.seeds.insert(team, direct + 1);
            }
            if let Some(team) = eighth {
                self.seeds.insert(team, direct + 2);
            }
        }
    }

    fn open_first_round(&mut self) {
        let mut field: BTreeMap<Conference, Vec<TeamId>> = BTreeMap::new();
        for team in self.seeds.keys() {
            if let Some(conference) = self.conferences.get(team) {
                field.entry(*conference).or_default().push(*team);
            }
        }
        self.byes.clear();
        for (conference, teams) in field {
            self.pair_conference(Round::FirstRound, conference, teams);
        }
        self.current_round = Round::FirstRound;
    }

    /// Highest remaining seed against lowest. With an odd field the top seed sits out.
    fn pair_conference(&mut self, round: Round, conference: Conference, mut teams: Vec<TeamId>) {
        teams.sort_by_key(|team| (self.seeds.get(team).copied().unwrap_or(u8::MAX), *team));
        let mut rest = teams.as_slice();
        if rest.len() % 2 == 1 {
            self.byes.push(rest[0]);
            rest = &rest[1..];
        }
        let (mut lo, mut hi) = (0, rest.len());
        while lo + 1 < hi {
            let series = self.new_series(round, Some(conference), rest[lo], rest[hi - 1]);
            match round {
                Round::FirstRound => self.first_round.push(series),
                Round::ConferenceSemifinals => self.conference_semifinals.push(series),
                _ => self.conference_finals.push(series),
            }
            lo += 1;
            hi -= 1;
        }
    }

    /// Finals home court: better regular-season record, then better seed.
    fn finals_order(&self, a: TeamId, b: TeamId) -> std::cmp::Ordering {
        let by_record = match (self.records.get(&a), self.records.get(&b)) {
            (Some(ra), Some(rb)) => ra.rank_cmp(rb),
            _ => std::cmp::Ordering::Equal,
        };
        by_record.then_with(|| self.seeds.get(&a).cmp(&self.seeds.get(&b)))
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayInGame, PlayoffBracket, PlayoffSeries, Round};
    use crate::id::{GameId, SeasonId, SeriesId, TeamId};
    use crate::standings::{Standings, TeamRecord};
    use crate::{AwayHome, Conference, Date, Error, Game, PlayoffConfig};

    fn standings(per_conference: &[(Conference, usize)]) -> (Standings, Vec<TeamId>) {
        let mut standings = Standings::default();
        let mut order = Vec::new();
        for (conference, count) in per_conference {
            for i in 0..*count {
                let team_id = TeamId::new();
                let wins = u16::try_from(60 - i).unwrap();
                standings.records.insert(
                    team_id,
                    TeamRecord {
                        team_id,
                        name: format!("{} {:02}", conference, i + 1),
                        conference: *conference,
                        division: 0,
                        wins,
                        losses: 82 - wins,
                    },
                );
                order.push(team_id);
            }
        }
        (standings, order)
    }

    fn no_play_in() -> PlayoffConfig {
        PlayoffConfig {
            play_in: false,
            ..PlayoffConfig::default()
        }
    }

    fn game_won_by(series: &PlayoffSeries, winner: TeamId) -> Game {
        let mut game = Game::new(
            GameId::new(),
            Date::default(),
            AwayHome {
                away: series.away_team_id,
                home: series.home_team_id,
            },
        );
        game.series = Some(series.id);
        game.played = true;
        if winner == series.home_team_id {
            game.teams.home.score = 101;
            game.teams.away.score = 99;
        } else {
            game.teams.home.score = 99;
            game.teams.away.score = 101;
        }
        game
    }

    /// Plays out the round with `pick` choosing each series winner.
    fn finish_round(
        mut bracket: PlayoffBracket,
        pick: impl Fn(&PlayoffSeries) -> TeamId,
    ) -> PlayoffBracket {
        while let Some(series) = bracket.next_open_series().cloned() {
            let winner = pick(&series);
            bracket = bracket.record_result(&game_won_by(&series, winner)).unwrap();
        }
        bracket
    }

    fn seed_of(bracket: &PlayoffBracket, team: TeamId) -> u8 {
        bracket.seeds[&team]
    }

    #[test]
    fn eight_team_conference_follows_seed_order() {
        let (standings, teams) = standings(&[(Conference::East, 8)]);
        let bracket = PlayoffBracket::seed(SeasonId::new(), &standings, &no_play_in()).unwrap();
        assert_eq!(bracket.current_round, Round::FirstRound);

        let pairs = bracket
            .first_round
            .iter()
            .map(|s| (seed_of(&bracket, s.home_team_id), seed_of(&bracket, s.away_team_id)))
            .collect::<Vec<_>>();
        assert_eq!(pairs, [(1, 8), (2, 7), (3, 6), (4, 5)]);

        let bracket = finish_round(bracket, |s| s.home_team_id).advance_round();
        assert_eq!(bracket.current_round, Round::ConferenceSemifinals);
        let pairs = bracket
            .conference_semifinals
            .iter()
            .map(|s| (seed_of(&bracket, s.home_team_id), seed_of(&bracket, s.away_team_id)))
            .collect::<Vec<_>>();
        assert_eq!(pairs, [(1, 4), (2, 3)]);

        let bracket = finish_round(bracket, |s| s.home_team_id).advance_round();
        assert_eq!(bracket.current_round, Round::ConferenceFinals);
        let bracket = finish_round(bracket, |s| s.home_team_id).advance_round();
        // one conference means one champion and nobody to meet in the finals
        assert_eq!(bracket.current_round, Round::Finals);
        assert!(bracket.finals.is_none());
        assert!(bracket.is_round_complete());
        let bracket = bracket.advance_round();
        assert_eq!(bracket.current_round, Round::Complete);
        assert_eq!(bracket.champion, Some(teams[0]));
    }

    #[test]
    fn series_is_decided_exactly_once() {
        let (home, away) = (TeamId::new(), TeamId::new());
        let mut series = PlayoffSeries::new(SeriesId::new(), Round::Finals, None, home, away, 4);
        for _ in 0..3 {
            series = series.with_result(&game_won_by(&series, away)).unwrap();
            assert_eq!(series.winner, None);
        }
        for _ in 0..3 {
            series = series.with_result(&game_won_by(&series, home)).unwrap();
        }
        assert_eq!(series.winner, None);
        series = series.with_result(&game_won_by(&series, home)).unwrap();
        assert_eq!(series.winner, Some(home));
        assert_eq!((series.home_wins, series.away_wins), (4, 3));
        assert_eq!(series.loser(), Some(away));

        let err = series.with_result(&game_won_by(&series, away)).unwrap_err();
        assert!(matches!(err, Error::InvalidStateTransition { .. }));
        assert_eq!(series.winner, Some(home));
    }

    #[test]
    fn foreign_games_are_rejected() {
        let series = PlayoffSeries::new(
            SeriesId::new(),
            Round::FirstRound,
            Some(Conference::West),
            TeamId::new(),
            TeamId::new(),
            4,
        );
        let other = PlayoffSeries::new(
            SeriesId::new(),
            Round::FirstRound,
            Some(Conference::West),
            TeamId::new(),
            TeamId::new(),
            4,
        );
        let game = game_won_by(&other, other.home_team_id);
        assert!(series.with_result(&game).is_err());

        let mut unplayed = game_won_by(&series, series.home_team_id);
        unplayed.played = false;
        assert!(series.with_result(&unplayed).is_err());
    }

    #[test]
    fn advancing_early_is_a_no_op() {
        let (standings, _) = standings(&[(Conference::East, 8), (Conference::West, 8)]);
        let bracket = PlayoffBracket::seed(SeasonId::new(), &standings, &no_play_in()).unwrap();
        let series = bracket.first_round[0].clone();
        let bracket = bracket
            .record_result(&game_won_by(&series, series.home_team_id))
            .unwrap();
        assert!(!bracket.is_round_complete());
        let before = bracket.clone();
        assert_eq!(bracket.advance_round(), before);
    }

    #[test]
    fn rounds_only_move_forward() {
        let (standings, _) = standings(&[(Conference::East, 10), (Conference::West, 10)]);
        let mut bracket =
            PlayoffBracket::seed(SeasonId::new(), &standings, &PlayoffConfig::default()).unwrap();
        let mut seen = vec![bracket.current_round];
        while bracket.current_round != Round::Complete {
            let before = bracket.current_round;
            // lower seeds win everything
            bracket = finish_round(bracket, |s| s.away_team_id).advance_round();
            assert!(bracket.current_round > before);
            seen.push(bracket.current_round);
        }
        assert_eq!(
            seen,
            [
                Round::PlayIn,
                Round::FirstRound,
                Round::ConferenceSemifinals,
                Round::ConferenceFinals,
                Round::Finals,
                Round::Complete
            ]
        );
        assert!(bracket.champion.is_some());
        let done = bracket.clone().advance_round();
        assert_eq!(done, bracket);
    }

    #[test]
    fn play_in_sets_the_last_two_seeds() {
        let (standings, teams) = standings(&[(Conference::East, 12)]);
        let bracket =
            PlayoffBracket::seed(SeasonId::new(), &standings, &PlayoffConfig::default()).unwrap();
        assert_eq!(bracket.current_round, Round::PlayIn);
        assert_eq!(bracket.play_in.len(), 2);
        assert!(!bracket.seeds.contains_key(&teams[10]));

        // 8 beats 7, 9 beats 10, then 9 beats 7 in the decider
        let (seven, eight, nine, ten) = (teams[6], teams[7], teams[8], teams[9]);
        let bracket = finish_round(bracket, |s| match s.play_in {
            Some(PlayInGame::SevenEight) => eight,
            Some(PlayInGame::NineTen) => nine,
            _ => nine,
        });
        assert_eq!(bracket.play_in.len(), 3);
        let decider = &bracket.play_in[2];
        assert_eq!((decider.home_team_id, decider.away_team_id), (seven, nine));
        assert!(bracket.is_eliminated(ten));
        assert!(bracket.is_eliminated(seven));
        assert!(!bracket.is_eliminated(eight));

        let bracket = bracket.advance_round();
        assert_eq!(bracket.current_round, Round::FirstRound);
        assert_eq!(bracket.seeds[&eight], 7);
        assert_eq!(bracket.seeds[&nine], 8);
        assert!(!bracket.seeds.contains_key(&seven));
        let top = &bracket.first_round[0];
        assert_eq!((top.home_team_id, top.away_team_id), (teams[0], nine));
    }

    #[test]
    fn play_in_round_waits_for_deciders() {
        let (standings, teams) = standings(&[(Conference::West, 10)]);
        let bracket =
            PlayoffBracket::seed(SeasonId::new(), &standings, &PlayoffConfig::default()).unwrap();
        let stage_one = bracket.play_in.clone();
        let mut bracket = bracket;
        for series in &stage_one {
            bracket = bracket
                .record_result(&game_won_by(series, series.home_team_id))
                .unwrap();
        }
        assert_eq!(bracket.play_in.len(), 3);
        assert!(!bracket.is_round_complete());
        assert_eq!(
            bracket.user_team_series(teams[7]).map(|s| s.play_in),
            Some(Some(PlayInGame::Decider))
        );
    }

    #[test]
    fn odd_fields_give_the_top_seed_a_bye() {
        let (standings, teams) = standings(&[(Conference::East, 5), (Conference::West, 8)]);
        let bracket = PlayoffBracket::seed(SeasonId::new(), &standings, &no_play_in()).unwrap();
        let east = bracket
            .first_round
            .iter()
            .filter(|s| s.conference == Some(Conference::East))
            .collect::<Vec<_>>();
        assert_eq!(east.len(), 2);
        assert_eq!(bracket.byes, [teams[0]]);
        assert!(bracket.user_team_series(teams[0]).is_none());
        for series in &bracket.first_round {
            assert_ne!(series.home_team_id, series.away_team_id);
        }
        let mut appearances = bracket
            .first_round
            .iter()
            .flat_map(|s| [s.home_team_id, s.away_team_id])
            .collect::<Vec<_>>();
        let total = appearances.len();
        appearances.sort();
        appearances.dedup();
        assert_eq!(appearances.len(), total);

        let bracket = finish_round(bracket, |s| s.home_team_id).advance_round();
        // east: the bye team plus two winners, so the top seed sits out again
        assert_eq!(bracket.byes, [teams[0]]);
        assert_eq!(
            bracket
                .conference_semifinals
                .iter()
                .filter(|s| s.conference == Some(Conference::East))
                .count(),
            1
        );
    }

    #[test]
    fn better_record_hosts_the_finals() {
        let (standings, teams) = standings(&[(Conference::East, 8), (Conference::West, 8)]);
        let mut bracket = PlayoffBracket::seed(SeasonId::new(), &standings, &no_play_in()).unwrap();
        for _ in 0..3 {
            bracket = finish_round(bracket, |s| s.home_team_id).advance_round();
        }
        let finals = bracket.finals.clone().unwrap();
        assert_eq!(bracket.current_round, Round::Finals);
        // both top seeds have 60 wins; "East 01" sorts before "West 01"
        assert_eq!(finals.home_team_id, teams[0]);
        assert_eq!(finals.away_team_id, teams[8]);
        assert_eq!(bracket.user_team_series(teams[8]), Some(&finals));
    }

    #[test]
    fn too_few_teams_is_a_configuration_error() {
        let (standings, _) = standings(&[(Conference::East, 1)]);
        assert!(matches!(
            PlayoffBracket::seed(SeasonId::new(), &standings, &PlayoffConfig::default()),
            Err(Error::Configuration { .. })
        ));
    }
}
