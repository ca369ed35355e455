#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::uninlined_format_args
)]

mod config;
mod error;
mod game;
pub mod id;
mod player;
mod playoff;
mod rng;
pub mod rotation;
pub mod schedule;
mod season;
pub mod sim;
mod standings;
mod stats;
mod team;
mod util;
mod world;

pub use crate::config::{LeagueConfig, PlayoffConfig};
pub use crate::error::{Error, Result};
pub use crate::game::{AwayHome, BoxScore, Game, GameTeam, PlayerGameStats, TeamSelect};
pub use crate::player::{Attributes, Player, Position, RoleArchetype, Tendencies};
pub use crate::playoff::{PlayInGame, PlayoffBracket, PlayoffSeries, Round};
pub use crate::rng::Rng;
pub use crate::rotation::{DepthChartEntry, RotationConfig, Violation, Violations};
pub use crate::season::{League, Season, SeasonPhase};
pub use crate::standings::{Standings, TeamRecord};
pub use crate::stats::{PlayerTotals, StatBook, StatScope};
pub use crate::team::{Conference, LineupSlot, Team};
pub use crate::util::{ratio, Date};
pub use crate::world::World;

use crate::id::TeamId;
use serde::{Deserialize, Serialize};

/// The whole working state of a saved career: the random stream plus the [`World`] it drives.
#[derive(Debug, Deserialize, Serialize)]
pub struct GameState {
    rng: Rng,
    #[serde(flatten, deserialize_with = "deserialize_world")]
    world: World,
}

impl GameState {
    /// Starts a career in `year` with a freshly scheduled season.
    pub fn new(
        mut rng: Rng,
        config: LeagueConfig,
        league: League,
        user_team: TeamId,
        year: u16,
    ) -> Result<GameState> {
        let season = Season::new(&league, user_team, year, &config, &mut rng)?;
        GameState::from_parts(
            rng,
            World {
                config,
                league,
                season,
            },
        )
    }

    pub fn from_parts(rng: Rng, world: World) -> Result<GameState> {
        world.check_consistency().map_err(Error::configuration)?;
        Ok(GameState { rng, world })
    }

    pub fn into_parts(self) -> (Rng, World) {
        (self.rng, self.world)
    }

    pub fn rng(&mut self) -> &mut Rng {
        &mut self.rng
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &LeagueConfig {
        &self.world.config
    }

    pub fn league(&self) -> &League {
        &self.world.league
    }

    pub fn season(&self) -> &Season {
        &self.world.season
    }

    pub fn play_next(self) -> Result<GameState> {
        self.step(|season, league, config, rng| season.play_next(league, config, rng))
    }

    /// See [`Season::fast_forward`].
    pub fn fast_forward<F>(self, keep_going: F) -> Result<GameState>
    where
        F: FnMut(&Season) -> bool,
    {
        self.step(|season, league, config, rng| {
            season.fast_forward(league, config, rng, keep_going)
        })
    }

    fn step<F>(self, op: F) -> Result<GameState>
    where
        F: FnOnce(Season, &League, &LeagueConfig, &mut Rng) -> Result<Season>,
    {
        let GameState { mut rng, world } = self;
        let World {
            config,
            league,
            season,
        } = world;
        let season = op(season, &league, &config, &mut rng)?;
        Ok(GameState {
            rng,
            world: World {
                config,
                league,
                season,
            },
        })
    }

    /// Swaps in an edited team between games. A saved rotation has to pass the validator.
    pub fn update_team(self, team: Team) -> Result<GameState> {
        if let Some(rotation) = &team.rotation {
            rotation::validate(rotation, &team.roster, &self.world.config).into_result()?;
        }
        let GameState { rng, mut world } = self;
        world.league = world.league.update_team(team)?;
        Ok(GameState { rng, world })
    }
}

fn deserialize_world<'de, D>(deserializer: D) -> std::result::Result<World, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let world = World::deserialize(deserializer)?;
    world
        .check_consistency()
        .map_err(serde::de::Error::custom)?;
    Ok(world)
}
