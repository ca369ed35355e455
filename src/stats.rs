//! Running per-player totals for a season or a postseason.

use crate::id::{GameId, PlayerId, TeamId};
use crate::util::ratio;
use crate::{Error, Game, League, PlayerGameStats, Result, TeamSelect};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which players a [`StatBook`] follows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum StatScope {
    /// Only the user's team.
    #[default]
    UserTeam,
    League,
}

impl StatScope {
    pub fn includes(self, team: TeamId, user_team: TeamId) -> bool {
        match self {
            StatScope::UserTeam => team == user_team,
            StatScope::League => true,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlayerTotals {
    pub player_id: PlayerId,
    /// Team the player last recorded a game for.
    pub team_id: TeamId,
    pub games: u32,
    pub totals: PlayerGameStats,
}

fn per_game(total: u32, games: u32) -> f64 {
    ratio(total, games).unwrap_or(0.0)
}

impl PlayerTotals {
    pub fn points_per_game(&self) -> f64 {
        per_game(self.totals.points, self.games)
    }

    pub fn rebounds_per_game(&self) -> f64 {
        per_game(self.totals.rebounds(), self.games)
    }

    pub fn assists_per_game(&self) -> f64 {
        per_game(self.totals.assists, self.games)
    }

    pub fn minutes_per_game(&self) -> f64 {
        per_game(self.totals.minutes, self.games)
    }

    pub fn field_goal_pct(&self) -> Option<f64> {
        self.totals.field_goal_pct()
    }

    pub fn three_point_pct(&self) -> Option<f64> {
        self.totals.three_point_pct()
    }

    pub fn free_throw_pct(&self) -> Option<f64> {
        self.totals.free_throw_pct()
    }

    /// PTS / (2 * (FGA + 0.44 * FTA)).
    pub fn true_shooting_pct(&self) -> Option<f64> {
        let t = &self.totals;
        let shots = f64::from(t.field_goals_attempted) + 0.44 * f64::from(t.free_throws_attempted);
        if shots > 0.0 {
            Some(f64::from(t.points) / (2.0 * shots))
        } else {
            None
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatBook {
    pub players: BTreeMap<PlayerId, PlayerTotals>,
    recorded: BTreeSet<GameId>,
}

impl StatBook {
    pub fn get(&self, player: PlayerId) -> Option<&PlayerTotals> {
        self.players.get(&player)
    }

    pub fn has_recorded(&self, game: GameId) -> bool {
        self.recorded.contains(&game)
    }

    pub fn games_recorded(&self) -> usize {
        self.recorded.len()
    }

    /// Folds the in-scope box scores of a played game. Every line is checked against its team's
    /// roster first, so a failed call leaves the book as it was.
    pub fn record(
        &mut self,
        game: &Game,
        league: &League,
        scope: StatScope,
        user_team: TeamId,
    ) -> Result<()> {
        if self.recorded.contains(&game.id) {
            return Err(Error::GameAlreadyRecorded(game.id));
        }
        if !game.played {
            return Err(Error::transition(format!(
                "game {} has not been played",
                game.id
            )));
        }

        let mut lines = Vec::new();
        for side in TeamSelect::BOTH {
            let team = game.teams.select(side);
            if !scope.includes(team.id, user_team) {
                continue;
            }
            let roster = team.id.load(league)?;
            for (player_id, line) in team.box_score.iter() {
                if !roster.has_player(*player_id) {
                    return Err(Error::MissingPlayer(*player_id));
                }
                lines.push((team.id, *player_id, line));
            }
        }

        for (team_id, player_id, line) in lines {
            let entry = self.players.entry(player_id).or_insert_with(|| PlayerTotals {
                player_id,
                ..PlayerTotals::default()
            });
            entry.team_id = team_id;
            entry.games += 1;
            entry.totals += line;
        }
        self.recorded.insert(game.id);
        log::debug!("recorded stats for game {}", game.id);
        Ok(())
    }

    /// Players sorted by `key`, highest first, for leaderboards.
    pub fn leaders<F>(&self, key: F) -> Vec<&PlayerTotals>
    where
        F: Fn(&PlayerTotals) -> f64,
    {
        let mut leaders = self.players.values().collect::<Vec<_>>();
        leaders.sort_by(|a, b| key(b).total_cmp(&key(a)));
        leaders
    }
}
