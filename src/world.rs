use crate::id::{GameId, PlayerId};
use crate::rotation;
use crate::{League, LeagueConfig, Season};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Everything a save holds apart from the random stream.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct World {
    pub config: LeagueConfig,
    pub league: League,
    pub season: Season,
}

impl World {
    // Teams, rosters, games and the bracket all refer to each other by id, and nothing in the
    // types stops an edit from leaving an id dangling. These invariants are checked whenever a
    // `GameState` is built or deserialized.
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        if let Err(err) = self.config.validate() {
            problems.push(format!("- {}", err));
        }

        macro_rules! nil_check {
            ($iter:expr) => {
                for obj in $iter {
                    if obj.id.0.is_nil() {
                        problems.push(format!("- nil uuid: {:?}", obj.id));
                    }
                }
            };
        }
        nil_check!(self.league.teams.values());
        nil_check!(self.league.teams.values().flat_map(|t| &t.roster));
        nil_check!(self.season.games.iter().chain(&self.season.playoff_games));
        if self.season.id.0.is_nil() {
            problems.push("- nil season id".to_string());
        }

        for (key, team) in &self.league.teams {
            if team.id != *key {
                problems.push(format!("- team {} is keyed with {}", team.id, key));
            }
        }

        let mut players = BTreeSet::<PlayerId>::new();
        for team in self.league.teams() {
            for player in &team.roster {
                if !players.insert(player.id) {
                    problems.push(format!("- player {} is on more than one roster", player.id));
                }
            }
            if let Some(rotation) = &team.rotation {
                let violations = rotation::validate(rotation, &team.roster, &self.config);
                for violation in violations.iter() {
                    problems.push(format!("- {}: {}", team.full_name(), violation));
                }
            }
        }

        if self.league.team(self.season.user_team_id).is_err() {
            problems.push(format!(
                "- user team {} is not in the league",
                self.season.user_team_id
            ));
        }

        let mut games = BTreeSet::<GameId>::new();
        for game in self.season.games.iter().chain(&self.season.playoff_games) {
            if !games.insert(game.id) {
                problems.push(format!("- game {} appears twice", game.id));
            }
            for side in [&game.teams.away, &game.teams.home] {
                if self.league.team(side.id).is_err() {
                    problems.push(format!("- game {} refers to unknown team {}", game.id, side.id));
                }
                for player in side.box_score.keys() {
                    if !players.contains(player) {
                        problems.push(format!(
                            "- game {} has a line for unknown player {}",
                            game.id, player
                        ));
                    }
                }
            }
        }

        if let Some(bracket) = &self.season.playoffs {
            for team in bracket.seeds.keys().chain(bracket.conferences.keys()) {
                if self.league.team(*team).is_err() {
                    problems.push(format!("- bracket refers to unknown team {}", team));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("\n"))
        }
    }
}
