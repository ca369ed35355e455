//! League rules. Loaded by the caller from whatever format it stores settings in.

use crate::playoff::Round;
use crate::stats::StatScope;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LeagueConfig {
    /// Regular-season games every team plays.
    pub games_per_team: u16,
    /// Minutes each of the five positions must be covered for in one game.
    pub minutes_per_position: u8,
    pub roster_size: usize,
    pub min_rotation_size: usize,
    pub max_rotation_size: usize,
    pub playoffs: PlayoffConfig,
    /// Whose players feed the season and playoff stat books.
    pub stat_scope: StatScope,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            games_per_team: 82,
            minutes_per_position: 48,
            roster_size: 15,
            min_rotation_size: 6,
            max_rotation_size: 10,
            playoffs: PlayoffConfig::default(),
            stat_scope: StatScope::UserTeam,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayoffConfig {
    pub enabled: bool,
    /// Seeds per conference that qualify without the play-in.
    pub direct_seeds: u8,
    /// Seeds `direct_seeds + 1 ..= direct_seeds + 4` play for the last two spots.
    pub play_in: bool,
    pub first_round_wins: u8,
    pub semifinal_wins: u8,
    pub conference_final_wins: u8,
    pub final_wins: u8,
}

impl Default for PlayoffConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            direct_seeds: 6,
            play_in: true,
            first_round_wins: 4,
            semifinal_wins: 4,
            conference_final_wins: 4,
            final_wins: 4,
        }
    }
}

impl PlayoffConfig {
    /// Wins that decide a series in `round`. Play-in games are single elimination.
    pub fn wins_needed(&self, round: Round) -> u8 {
        match round {
            Round::PlayIn | Round::Complete => 1,
            Round::FirstRound => self.first_round_wins,
            Round::ConferenceSemifinals => self.semifinal_wins,
            Round::ConferenceFinals => self.conference_final_wins,
            Round::Finals => self.final_wins,
        }
    }

    /// Teams per conference that end up in the first round.
    pub fn bracket_size(&self) -> usize {
        usize::from(self.direct_seeds) + 2
    }
}

impl LeagueConfig {
    pub fn validate(&self) -> Result<()> {
        if self.games_per_team == 0 {
            return Err(Error::configuration("games_per_team must be positive"));
        }
        if self.minutes_per_position == 0 {
            return Err(Error::configuration("minutes_per_position must be positive"));
        }
        if self.roster_size < 5 {
            return Err(Error::configuration("a roster needs at least five players"));
        }
        if self.min_rotation_size < 5
            || self.min_rotation_size > self.max_rotation_size
            || self.max_rotation_size > self.roster_size
        {
            return Err(Error::configuration(format!(
                "rotation size range {}..={} does not fit a roster of {}",
                self.min_rotation_size, self.max_rotation_size, self.roster_size
            )));
        }
        let p = &self.playoffs;
        if p.enabled {
            // three conference rounds narrow at most eight teams to one
            if p.direct_seeds == 0 || p.bracket_size() > 8 {
                return Err(Error::configuration(format!(
                    "direct_seeds must be between 1 and 6, got {}",
                    p.direct_seeds
                )));
            }
            for round in [
                Round::FirstRound,
                Round::ConferenceSemifinals,
                Round::ConferenceFinals,
                Round::Finals,
            ] {
                if p.wins_needed(round) == 0 {
                    return Err(Error::configuration(format!(
                        "{} series need at least one win",
                        round
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::LeagueConfig;
    use crate::playoff::Round;

    #[test]
    fn defaults_are_valid() {
        let config = LeagueConfig::default();
        config.validate().unwrap();
        assert_eq!(config.playoffs.wins_needed(Round::PlayIn), 1);
        assert_eq!(config.playoffs.wins_needed(Round::Finals), 4);
        assert_eq!(config.playoffs.bracket_size(), 8);
    }

    #[test]
    fn partial_documents_fill_in_defaults() {
        let config: LeagueConfig =
            serde_json::from_str(r#"{"games_per_team": 20, "playoffs": {"play_in": false}}"#)
                .unwrap();
        assert_eq!(config.games_per_team, 20);
        assert!(!config.playoffs.play_in);
        assert_eq!(config.playoffs.direct_seeds, 6);
        assert_eq!(config.minutes_per_position, 48);
    }

    #[test]
    fn rejects_impossible_rotation_bounds() {
        let config = LeagueConfig {
            min_rotation_size: 11,
            max_rotation_size: 10,
            ..LeagueConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_brackets_wider_than_eight() {
        let mut config = LeagueConfig::default();
        config.playoffs.direct_seeds = 7;
        assert!(config.validate().is_err());
        config.playoffs.enabled = false;
        config.validate().unwrap();
    }
}
