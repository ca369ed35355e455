//! The league and one season's progress through it.

use crate::id::{GameId, PlayerId, SeasonId, TeamId};
use crate::playoff::{PlayoffBracket, PlayoffSeries, Round};
use crate::standings::{Standings, TeamRecord};
use crate::stats::StatBook;
use crate::{
    schedule, sim, AwayHome, Conference, Date, Error, Game, LeagueConfig, Player, Result, Rng,
    Team,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const CITIES: [&str; 30] = [
    "Harbor City",
    "Northfield",
    "Port Ellis",
    "Granite Falls",
    "Bayview",
    "Kingsbridge",
    "Lakeshore",
    "Millbrook",
    "Ashford",
    "Cedar Point",
    "Riverton",
    "Stonehaven",
    "Brookline",
    "Fairmont",
    "Easton",
    "Red Mesa",
    "Sierra Vista",
    "Copper Ridge",
    "Pine Hollow",
    "Silver Lake",
    "Dry Creek",
    "Westgate",
    "Sun Valley",
    "Coral Bay",
    "High Plains",
    "Thunder Basin",
    "Canyon City",
    "Iron Springs",
    "Golden Shore",
    "Redwood",
];

const NICKNAMES: [&str; 30] = [
    "Anchors",
    "Foxes",
    "Mariners",
    "Quarry",
    "Gulls",
    "Monarchs",
    "Waves",
    "Millers",
    "Knights",
    "Cannons",
    "Otters",
    "Sentinels",
    "Brooks",
    "Falcons",
    "Lanterns",
    "Scorpions",
    "Hawks",
    "Miners",
    "Owls",
    "Herons",
    "Rattlers",
    "Pioneers",
    "Blaze",
    "Reef",
    "Bison",
    "Storm",
    "Coyotes",
    "Forge",
    "Surf",
    "Giants",
];

/// Every team, keyed by id.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct League {
    pub(crate) teams: BTreeMap<TeamId, Team>,
}

impl League {
    pub fn new<I>(teams: I) -> League
    where
        I: IntoIterator<Item = Team>,
    {
        League {
            teams: teams.into_iter().map(|team| (team.id, team)).collect(),
        }
    }

    /// Thirty teams over two conferences of three five-team divisions, each with a generated
    /// roster and a default rotation.
    pub fn generate(rng: &mut Rng, config: &LeagueConfig) -> Result<League> {
        let mut teams = Vec::new();
        let names = CITIES.into_iter().zip(NICKNAMES);
        for (i, (city, nickname)) in names.enumerate() {
            let conference = Conference::ALL[i / 15];
            let division = u8::try_from(i % 15 / 5).unwrap_or(0);
            teams.push(Team::generate(
                rng,
                city.to_string(),
                nickname.to_string(),
                conference,
                division,
                config,
            )?);
        }
        log::info!("generated a league of {} teams", teams.len());
        Ok(League::new(teams))
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        id.load(self)
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> + '_ {
        self.teams.values()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Finds a player anywhere in the league, along with their team.
    pub fn player(&self, id: PlayerId) -> Result<(&Team, &Player)> {
        self.teams
            .values()
            .find_map(|team| team.player(id).ok().map(|player| (team, player)))
            .ok_or(Error::MissingPlayer(id))
    }

    /// Replaces a team with an edited copy. The team must already be in the league.
    pub fn update_team(mut self, team: Team) -> Result<League> {
        let slot = self
            .teams
            .get_mut(&team.id)
            .ok_or(Error::MissingTeam(team.id))?;
        *slot = team;
        Ok(self)
    }

    fn teams_of(&self, teams: AwayHome<TeamId>) -> Result<AwayHome<&Team>> {
        Ok(AwayHome {
            away: self.team(teams.away)?,
            home: self.team(teams.home)?,
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum SeasonPhase {
    #[default]
    RegularSeason,
    Postseason,
    Complete,
}

/// One season: the schedule, the bracket, and the stats both produce.
///
/// Every operation takes the season by value and hands back the next one. Operations only fail
/// on structurally invalid league data; callers that want to recover from that should keep a
/// copy (or the last save) around.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Season {
    pub id: SeasonId,
    pub year: u16,
    pub user_team_id: TeamId,
    /// Regular-season games, in calendar order.
    pub games: Vec<Game>,
    pub season_stats: StatBook,
    pub playoff_stats: StatBook,
    pub playoffs: Option<PlayoffBracket>,
    pub playoff_games: Vec<Game>,
    pub phase: SeasonPhase,
}

impl Season {
    pub fn new(
        league: &League,
        user_team_id: TeamId,
        year: u16,
        config: &LeagueConfig,
        rng: &mut Rng,
    ) -> Result<Season> {
        config.validate()?;
        let user = league.team(user_team_id)?;
        let mut games = schedule::generate(league.teams(), user_team_id, config, rng)?;
        for game in &mut games {
            game.date.season = year;
        }
        log::info!(
            "{} season created for {} with {} games",
            year,
            user.full_name(),
            games.len()
        );
        Ok(Season {
            id: SeasonId::generate(rng),
            year,
            user_team_id,
            games,
            season_stats: StatBook::default(),
            playoff_stats: StatBook::default(),
            playoffs: None,
            playoff_games: Vec::new(),
            phase: SeasonPhase::RegularSeason,
        })
    }

    pub fn standings(&self, league: &League) -> Standings {
        Standings::from_games(league.teams(), &self.games)
    }

    /// The user team's regular-season wins and losses.
    pub fn user_record(&self) -> (u16, u16) {
        let mut record = (0, 0);
        for game in self.games.iter().filter(|g| g.involves(self.user_team_id)) {
            match game.winner() {
                Some(winner) if winner == self.user_team_id => record.0 += 1,
                Some(_) => record.1 += 1,
                None => {}
            }
        }
        record
    }

    pub fn user_team_record(&self, league: &League) -> Option<TeamRecord> {
        self.standings(league).record(self.user_team_id).cloned()
    }

    /// Next unplayed regular-season game.
    pub fn next_game(&self) -> Option<&Game> {
        self.games.iter().find(|g| !g.played)
    }

    /// Next unplayed game involving the user team.
    pub fn next_user_game(&self) -> Option<&Game> {
        self.games
            .iter()
            .find(|g| !g.played && g.involves(self.user_team_id))
    }

    pub fn game(&self, id: GameId) -> Result<&Game> {
        self.games
            .iter()
            .chain(&self.playoff_games)
            .find(|g| g.id == id)
            .ok_or(Error::MissingGame(id))
    }

    pub fn user_team_series(&self) -> Option<&PlayoffSeries> {
        self.playoffs
            .as_ref()
            .and_then(|bracket| bracket.user_team_series(self.user_team_id))
    }

    pub fn champion(&self) -> Option<TeamId> {
        self.playoffs.as_ref().and_then(|bracket| bracket.champion)
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SeasonPhase::Complete
    }

    /// Plays the next game of whichever phase the season is in.
    pub fn play_next(self, league: &League, config: &LeagueConfig, rng: &mut Rng) -> Result<Season> {
        match self.phase {
            SeasonPhase::RegularSeason => self.play_regular_season_game(league, config, rng),
            SeasonPhase::Postseason => self.play_playoff_game(league, config, rng),
            SeasonPhase::Complete => Err(Error::transition(format!(
                "the {} season is already over",
                self.year
            ))),
        }
    }

    /// Plays games until the season ends or `keep_going` says stop. `keep_going` is asked
    /// before every game, never in the middle of one.
    pub fn fast_forward<F>(
        self,
        league: &League,
        config: &LeagueConfig,
        rng: &mut Rng,
        mut keep_going: F,
    ) -> Result<Season>
    where
        F: FnMut(&Season) -> bool,
    {
        let mut season = self;
        while !season.is_complete() && keep_going(&season) {
            season = season.play_next(league, config, rng)?;
        }
        Ok(season)
    }

    fn play_regular_season_game(
        mut self,
        league: &League,
        config: &LeagueConfig,
        rng: &mut Rng,
    ) -> Result<Season> {
        let Some(index) = self.games.iter().position(|g| !g.played) else {
            return self.finish_regular_season(league, config);
        };
        let scheduled = self.games[index].clone();
        let teams = league.teams_of(AwayHome {
            away: scheduled.away_id(),
            home: scheduled.home_id(),
        })?;
        let game = sim::play_scheduled(scheduled, teams, config, rng)?;
        self.season_stats
            .record(&game, league, config.stat_scope, self.user_team_id)?;
        self.games[index] = game;

        if self.games.iter().all(|g| g.played) {
            return self.finish_regular_season(league, config);
        }
        Ok(self)
    }

    fn finish_regular_season(mut self, league: &League, config: &LeagueConfig) -> Result<Season> {
        let (wins, losses) = self.user_record();
        log::info!(
            "{} regular season over, user team finished {}-{}",
            self.year,
            wins,
            losses
        );
        if !config.playoffs.enabled {
            self.phase = SeasonPhase::Complete;
            return Ok(self);
        }
        let bracket = PlayoffBracket::seed(self.id, &self.standings(league), &config.playoffs)?;
        self.phase = SeasonPhase::Postseason;
        Ok(self.with_bracket(bracket))
    }

    fn play_playoff_game(
        mut self,
        league: &League,
        config: &LeagueConfig,
        rng: &mut Rng,
    ) -> Result<Season> {
        let bracket = self
            .playoffs
            .take()
            .ok_or_else(|| Error::transition("postseason has no bracket"))?;
        let series = bracket.next_open_series().cloned().ok_or_else(|| {
            Error::transition(format!(
                "no series left to play in the {}",
                bracket.current_round
            ))
        })?;

        let teams = league.teams_of(AwayHome {
            away: series.away_team_id,
            home: series.home_team_id,
        })?;
        let date = self.next_playoff_date();
        let game = sim::simulate(teams, Some(&series), date, config, rng)?;
        let bracket = bracket.record_result(&game)?;
        self.playoff_stats
            .record(&game, league, config.stat_scope, self.user_team_id)?;
        self.playoff_games.push(game);
        Ok(self.with_bracket(bracket))
    }

    /// Stores the bracket, first moving it past any rounds that are already decided.
    fn with_bracket(mut self, mut bracket: PlayoffBracket) -> Season {
        while bracket.current_round != Round::Complete && bracket.is_round_complete() {
            bracket = bracket.advance_round();
        }
        if bracket.current_round == Round::Complete {
            self.phase = SeasonPhase::Complete;
            log::info!("{} season complete", self.year);
        }
        self.playoffs = Some(bracket);
        self
    }

    /// Playoff games follow the regular season one day at a time.
    fn next_playoff_date(&self) -> Date {
        let last = self
            .playoff_games
            .last()
            .or_else(|| self.games.last())
            .map_or(Date::default(), |g| g.date);
        Date {
            season: self.year,
            ..last
        }
        .next_day()
    }
}
