use crate::id::{PlayerId, TeamId};
use crate::rotation::{self, RotationConfig};
use crate::{Date, Error, LeagueConfig, Player, Position, Result, RoleArchetype, Rng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Conference {
    #[default]
    East,
    West,
}

impl Conference {
    pub const ALL: [Conference; 2] = [Conference::East, Conference::West];
}

impl Display for Conference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conference::East => f.write_str("East"),
            Conference::West => f.write_str("West"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct Team {
    pub id: TeamId,
    pub city: String,
    pub name: String,
    pub conference: Conference,
    /// Division index within the conference.
    pub division: u8,
    pub roster: Vec<Player>,
    pub starters: Vec<PlayerId>,
    pub rotation: Option<RotationConfig>,
}

/// One player's share of a game: where they line up and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineupSlot {
    pub player_id: PlayerId,
    pub position: Position,
    pub minutes: u8,
}

impl Team {
    pub fn new(id: TeamId, city: String, name: String, conference: Conference, division: u8) -> Team {
        Team {
            id,
            city,
            name,
            conference,
            division,
            ..Team::default()
        }
    }

    /// A full roster cycled through the five positions, with a default rotation applied.
    pub fn generate(
        rng: &mut Rng,
        city: String,
        name: String,
        conference: Conference,
        division: u8,
        config: &LeagueConfig,
    ) -> Result<Team> {
        let mut team = Team::new(TeamId::generate(rng), city, name, conference, division);
        let strength = rng.range(0, 12);
        for (i, position) in Position::ALL
            .into_iter()
            .cycle()
            .take(config.roster_size)
            .enumerate()
        {
            // starters first, then bench, then deep reserves
            let tier = u32::try_from(i / Position::ALL.len()).unwrap_or(u32::MAX);
            let quality = (72 + strength).saturating_sub(tier.saturating_mul(8));
            let name = format!("{} {}{}", team.name, position.abbreviation(), i + 1);
            team.roster.push(Player::generate(rng, name, position, quality));
        }
        let rotation = RotationConfig::from_roster(&team.roster, config, Date::default())?;
        team.with_rotation(rotation, config)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.city, self.name)
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.roster
            .iter()
            .find(|p| p.id == id)
            .ok_or(Error::MissingPlayer(id))
    }

    pub fn has_player(&self, id: PlayerId) -> bool {
        self.roster.iter().any(|p| p.id == id)
    }

    /// Minutes-weighted overall of whoever takes the floor.
    pub fn rating(&self, config: &LeagueConfig) -> f64 {
        let Ok(lineup) = self.lineup(config) else {
            return 0.0;
        };
        let mut weighted = 0.0;
        let mut minutes = 0.0;
        for slot in lineup {
            if let Ok(player) = self.player(slot.player_id) {
                weighted += player.overall_at(slot.position) * f64::from(slot.minutes);
                minutes += f64::from(slot.minutes);
            }
        }
        if minutes > 0.0 {
            weighted / minutes
        } else {
            0.0
        }
    }

    /// Who plays and for how long: the rotation if one is saved, else the five starters for a
    /// full game each.
    pub fn lineup(&self, config: &LeagueConfig) -> Result<Vec<LineupSlot>> {
        if let Some(rotation) = &self.rotation {
            let mut slots = Vec::new();
            for (player_id, minutes) in rotation.active_players() {
                let player = self.player(player_id)?;
                let position = rotation
                    .slot_of(player_id)
                    .map_or(player.position, |e| e.position);
                slots.push(LineupSlot {
                    player_id,
                    position,
                    minutes,
                });
            }
            if slots.is_empty() {
                return Err(Error::configuration(format!(
                    "{} has a rotation with no minutes",
                    self.full_name()
                )));
            }
            return Ok(slots);
        }

        if self.starters.len() != Position::ALL.len() {
            return Err(Error::configuration(format!(
                "{} has no rotation and {} starters",
                self.full_name(),
                self.starters.len()
            )));
        }
        log::warn!(
            "{} has no rotation, starters play the whole game",
            self.full_name()
        );
        self.starters
            .iter()
            .map(|id| {
                let player = self.player(*id)?;
                Ok(LineupSlot {
                    player_id: *id,
                    position: player.position,
                    minutes: config.minutes_per_position,
                })
            })
            .collect()
    }

    pub fn with_position(mut self, player: PlayerId, position: Position) -> Result<Team> {
        let slot = self
            .roster
            .iter_mut()
            .find(|p| p.id == player)
            .ok_or(Error::MissingPlayer(player))?;
        slot.position = position;
        Ok(self)
    }

    pub fn with_role(mut self, player: PlayerId, role: Option<RoleArchetype>) -> Result<Team> {
        let slot = self
            .roster
            .iter_mut()
            .find(|p| p.id == player)
            .ok_or(Error::MissingPlayer(player))?;
        slot.role = role;
        Ok(self)
    }

    pub fn with_starters(mut self, starters: Vec<PlayerId>) -> Result<Team> {
        let distinct = starters.iter().collect::<BTreeSet<_>>();
        if starters.len() != Position::ALL.len() || distinct.len() != starters.len() {
            return Err(Error::configuration(format!(
                "a starting lineup is five different players, got {:?}",
                starters
            )));
        }
        if let Some(missing) = starters.iter().find(|id| !self.has_player(**id)) {
            return Err(Error::MissingPlayer(*missing));
        }
        self.starters = starters;
        Ok(self)
    }

    /// Saves `rotation` if it passes the validator; its depth-1 players become the starters.
    pub fn with_rotation(mut self, rotation: RotationConfig, config: &LeagueConfig) -> Result<Team> {
        rotation::validate(&rotation, &self.roster, config).into_result()?;
        self.starters = rotation.starters();
        self.rotation = Some(rotation);
        Ok(self)
    }

    pub fn without_rotation(mut self) -> Team {
        self.rotation = None;
        self
    }
}
