use crate::id::{GameId, PlayerId, SeriesId, TeamId};
use crate::util::ratio;
use crate::Date;
use derive_more::Deref;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::AddAssign;

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct Game {
    pub id: GameId,
    #[serde(flatten)]
    pub date: Date,
    pub teams: AwayHome<GameTeam>,
    pub played: bool,
    pub overtimes: u8,
    /// Set for postseason games.
    pub series: Option<SeriesId>,
    /// 1-based position within the series.
    pub game_number: u8,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct GameTeam {
    pub id: TeamId,
    pub score: u16,
    pub box_score: BoxScore,
}

impl Game {
    pub fn new(id: GameId, date: Date, teams: AwayHome<TeamId>) -> Game {
        Game {
            id,
            date,
            teams: teams.map(|id| GameTeam {
                id,
                ..GameTeam::default()
            }),
            ..Game::default()
        }
    }

    pub fn home_id(&self) -> TeamId {
        self.teams.home.id
    }

    pub fn away_id(&self) -> TeamId {
        self.teams.away.id
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.home_id() == team || self.away_id() == team
    }

    pub fn side_of(&self, team: TeamId) -> Option<TeamSelect> {
        if self.home_id() == team {
            Some(TeamSelect::Home)
        } else if self.away_id() == team {
            Some(TeamSelect::Away)
        } else {
            None
        }
    }

    pub fn winner(&self) -> Option<TeamId> {
        if !self.played || self.teams.home.score == self.teams.away.score {
            return None;
        }
        Some(if self.teams.home.score > self.teams.away.score {
            self.home_id()
        } else {
            self.away_id()
        })
    }

    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner()?;
        Some(if winner == self.home_id() {
            self.away_id()
        } else {
            self.home_id()
        })
    }
}

/// Per-player box-score line for one game. Percentages are always derived.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlayerGameStats {
    pub minutes: u32,
    pub points: u32,
    pub offensive_rebounds: u32,
    pub defensive_rebounds: u32,
    pub assists: u32,
    pub field_goals_made: u32,
    pub field_goals_attempted: u32,
    pub threes_made: u32,
    pub threes_attempted: u32,
    pub free_throws_made: u32,
    pub free_throws_attempted: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub fouls: u32,
}

impl PlayerGameStats {
    pub fn rebounds(&self) -> u32 {
        self.offensive_rebounds + self.defensive_rebounds
    }

    pub fn field_goal_pct(&self) -> Option<f64> {
        ratio(self.field_goals_made, self.field_goals_attempted)
    }

    pub fn three_point_pct(&self) -> Option<f64> {
        ratio(self.threes_made, self.threes_attempted)
    }

    pub fn free_throw_pct(&self) -> Option<f64> {
        ratio(self.free_throws_made, self.free_throws_attempted)
    }

    /// Points implied by the shooting lines.
    pub fn points_from_shots(&self) -> u32 {
        2 * self.field_goals_made.saturating_sub(self.threes_made)
            + 3 * self.threes_made
            + self.free_throws_made
    }

    /// Makes never exceed attempts, and threes are a subset of field goals.
    pub fn is_consistent(&self) -> bool {
        self.field_goals_made <= self.field_goals_attempted
            && self.threes_made <= self.threes_attempted
            && self.free_throws_made <= self.free_throws_attempted
            && self.threes_made <= self.field_goals_made
            && self.threes_attempted <= self.field_goals_attempted
            && self.points == self.points_from_shots()
    }
}

impl AddAssign<&PlayerGameStats> for PlayerGameStats {
    fn add_assign(&mut self, rhs: &PlayerGameStats) {
        self.minutes += rhs.minutes;
        self.points += rhs.points;
        self.offensive_rebounds += rhs.offensive_rebounds;
        self.defensive_rebounds += rhs.defensive_rebounds;
        self.assists += rhs.assists;
        self.field_goals_made += rhs.field_goals_made;
        self.field_goals_attempted += rhs.field_goals_attempted;
        self.threes_made += rhs.threes_made;
        self.threes_attempted += rhs.threes_attempted;
        self.free_throws_made += rhs.free_throws_made;
        self.free_throws_attempted += rhs.free_throws_attempted;
        self.steals += rhs.steals;
        self.blocks += rhs.blocks;
        self.turnovers += rhs.turnovers;
        self.fouls += rhs.fouls;
    }
}

/// One team's lines for a game, keyed by player.
#[derive(Debug, Default, Clone, PartialEq, Deref, Deserialize, Serialize)]
pub struct BoxScore(pub BTreeMap<PlayerId, PlayerGameStats>);

impl BoxScore {
    pub fn points(&self) -> u32 {
        self.0.values().map(|s| s.points).sum()
    }

    pub fn totals(&self) -> PlayerGameStats {
        let mut totals = PlayerGameStats::default();
        for line in self.0.values() {
            totals += line;
        }
        totals
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct AwayHome<T> {
    pub away: T,
    pub home: T,
}

impl<T> AwayHome<T> {
    pub fn map<U, F>(self, mut op: F) -> AwayHome<U>
    where
        F: FnMut(T) -> U,
    {
        AwayHome {
            away: op(self.away),
            home: op(self.home),
        }
    }

    pub fn by_ref(&self) -> AwayHome<&T> {
        AwayHome {
            away: &self.away,
            home: &self.home,
        }
    }

    pub fn select(&self, select: TeamSelect) -> &T {
        match select {
            TeamSelect::Away => &self.away,
            TeamSelect::Home => &self.home,
        }
    }

    pub fn select_mut(&mut self, select: TeamSelect) -> &mut T {
        match select {
            TeamSelect::Away => &mut self.away,
            TeamSelect::Home => &mut self.home,
        }
    }

    pub fn swap(self) -> AwayHome<T> {
        AwayHome {
            away: self.home,
            home: self.away,
        }
    }
}

impl<T> AwayHome<Option<T>> {
    pub fn transpose(self) -> Option<AwayHome<T>> {
        Some(AwayHome {
            away: self.away?,
            home: self.home?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSelect {
    Away,
    Home,
}

impl TeamSelect {
    pub const BOTH: [TeamSelect; 2] = [TeamSelect::Away, TeamSelect::Home];

    pub fn other(self) -> TeamSelect {
        match self {
            TeamSelect::Away => TeamSelect::Home,
            TeamSelect::Home => TeamSelect::Away,
        }
    }
}
