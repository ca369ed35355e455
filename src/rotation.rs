//! Rotation and depth-chart legality.
//!
//! [`validate`] is a pure check that reports every problem at once. Nothing here ever repairs a
//! configuration; callers gate their save/apply actions on an empty [`Violations`] list.

use crate::id::PlayerId;
use crate::{Date, Error, LeagueConfig, Player, Position, Result};
use derive_more::Deref;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};

const DEFAULT_ROTATION_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DepthChartEntry {
    pub player_id: PlayerId,
    pub position: Position,
    /// 1 is the starter.
    pub depth: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RotationConfig {
    pub rotation_size: usize,
    pub player_minutes: BTreeMap<PlayerId, u8>,
    pub depth_chart: Vec<DepthChartEntry>,
    pub last_modified: Date,
}

impl RotationConfig {
    /// A rotation sized to the league's bounds, ten deep when they allow it.
    ///
    /// Every position gets a starter, then backups are added a depth at a time. A slot is filled
    /// from the players listed at that position first, then by the best remaining fit from the
    /// rest of the roster. Starters keep two thirds of the position's minutes and the backups
    /// split the rest.
    pub fn from_roster(roster: &[Player], config: &LeagueConfig, date: Date) -> Result<Self> {
        let positions = Position::ALL.len();
        if roster.len() < positions {
            return Err(Error::configuration(format!(
                "a rotation needs five players, roster has {}",
                roster.len()
            )));
        }
        let size = DEFAULT_ROTATION_SIZE
            .max(config.min_rotation_size)
            .min(config.max_rotation_size)
            .max(positions)
            .min(roster.len());

        let full = config.minutes_per_position;
        let bench_minutes = full / 3;
        let mut used = BTreeSet::new();
        let mut depth_chart = Vec::new();

        let best_fit = |position: Position, used: &BTreeSet<PlayerId>| {
            let pick = |listed_only: bool| {
                roster
                    .iter()
                    .filter(|p| !used.contains(&p.id))
                    .filter(|p| !listed_only || p.position == position)
                    .max_by(|a, b| {
                        a.overall_at(position)
                            .total_cmp(&b.overall_at(position))
                            .then(b.id.cmp(&a.id))
                    })
                    .map(|p| p.id)
            };
            pick(true).or_else(|| pick(false))
        };

        // Starters first across all positions, so a thin position can't steal another's starter.
        let mut depth = 1_u8;
        while used.len() < size {
            let before = used.len();
            for position in Position::ALL {
                if used.len() == size {
                    break;
                }
                // every backup needs at least a minute of the bench share
                if depth > 1 && u16::from(bench_minutes) < u16::from(depth - 1) {
                    continue;
                }
                if let Some(id) = best_fit(position, &used) {
                    used.insert(id);
                    depth_chart.push(DepthChartEntry {
                        player_id: id,
                        position,
                        depth,
                    });
                }
            }
            if used.len() == before || depth == u8::MAX {
                break;
            }
            depth += 1;
        }
        if used.len() < config.min_rotation_size {
            return Err(Error::configuration(format!(
                "{} minutes per position cannot be split across a rotation of {}",
                full, config.min_rotation_size
            )));
        }

        let mut player_minutes = BTreeMap::new();
        for position in Position::ALL {
            let mut slots = depth_chart
                .iter()
                .filter(|e| e.position == position)
                .collect::<Vec<_>>();
            slots.sort_by_key(|e| e.depth);
            let Some((starter, backups)) = slots.split_first() else {
                continue;
            };
            if backups.is_empty() {
                player_minutes.insert(starter.player_id, full);
                continue;
            }
            player_minutes.insert(starter.player_id, full - bench_minutes);
            let count = u8::try_from(backups.len()).unwrap_or(u8::MAX);
            for (i, backup) in (0_u8..).zip(backups) {
                let share = bench_minutes / count + u8::from(i < bench_minutes % count);
                player_minutes.insert(backup.player_id, share);
            }
        }

        Ok(RotationConfig {
            rotation_size: player_minutes.values().filter(|m| **m > 0).count(),
            player_minutes,
            depth_chart,
            last_modified: date,
        })
    }

    pub fn minutes(&self, player: PlayerId) -> u8 {
        self.player_minutes.get(&player).copied().unwrap_or(0)
    }

    /// Depth-1 players in position order.
    pub fn starters(&self) -> Vec<PlayerId> {
        Position::ALL
            .into_iter()
            .filter_map(|position| {
                self.depth_chart
                    .iter()
                    .find(|e| e.position == position && e.depth == 1)
                    .map(|e| e.player_id)
            })
            .collect()
    }

    /// Players with nonzero minutes, heaviest first.
    pub fn active_players(&self) -> Vec<(PlayerId, u8)> {
        let mut active = self
            .player_minutes
            .iter()
            .filter(|(_, m)| **m > 0)
            .map(|(id, m)| (*id, *m))
            .collect::<Vec<_>>();
        active.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        active
    }

    /// Slot the player is listed in, preferring the shallowest depth.
    pub fn slot_of(&self, player: PlayerId) -> Option<&DepthChartEntry> {
        self.depth_chart
            .iter()
            .filter(|e| e.player_id == player)
            .min_by_key(|e| e.depth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum Violation {
    MissingStarter(Position),
    DepthNotContiguous { position: Position, depths: Vec<u8> },
    PositionMinutes { position: Position, total: u32, required: u8 },
    StarterWithoutMinutes { position: Position, player: PlayerId },
    RotationSizeMismatch { declared: usize, actual: usize },
    RotationSizeOutOfRange { actual: usize, min: usize, max: usize },
    UnknownPlayer(PlayerId),
    ListedTwice(PlayerId),
    TooManyMinutes { player: PlayerId, minutes: u8 },
    MinutesWithoutSlot(PlayerId),
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingStarter(position) => write!(f, "no starter at {}", position),
            Violation::DepthNotContiguous { position, depths } => write!(
                f,
                "depth chart at {} must run 1, 2, 3... without gaps or repeats (found {:?})",
                position, depths
            ),
            Violation::PositionMinutes {
                position,
                total,
                required,
            } => write!(
                f,
                "{} is covered for {} minutes, needs exactly {}",
                position, total, required
            ),
            Violation::StarterWithoutMinutes { position, player } => {
                write!(f, "starter {} at {} has no minutes", player, position)
            }
            Violation::RotationSizeMismatch { declared, actual } => write!(
                f,
                "rotation size is {} but {} players have minutes",
                declared, actual
            ),
            Violation::RotationSizeOutOfRange { actual, min, max } => write!(
                f,
                "{} players in the rotation, league allows {} to {}",
                actual, min, max
            ),
            Violation::UnknownPlayer(player) => write!(f, "player {} is not on the roster", player),
            Violation::ListedTwice(player) => {
                write!(f, "player {} is listed at more than one position", player)
            }
            Violation::TooManyMinutes { player, minutes } => {
                write!(f, "player {} is given {} minutes", player, minutes)
            }
            Violation::MinutesWithoutSlot(player) => write!(
                f,
                "player {} has minutes but no depth chart slot",
                player
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Deserialize, Serialize)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when empty, otherwise the whole list as an error.
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidRotation(self))
        }
    }
}

impl Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "- {}", violation)?;
        }
        Ok(())
    }
}

pub fn validate(config: &RotationConfig, roster: &[Player], league: &LeagueConfig) -> Violations {
    let mut problems = Vec::new();
    let on_roster = roster.iter().map(|p| p.id).collect::<BTreeSet<_>>();

    for position in Position::ALL {
        let mut depths = config
            .depth_chart
            .iter()
            .filter(|e| e.position == position)
            .map(|e| e.depth)
            .collect::<Vec<_>>();
        depths.sort_unstable();

        let starters = config
            .depth_chart
            .iter()
            .filter(|e| e.position == position && e.depth == 1)
            .collect::<Vec<_>>();
        if starters.is_empty() {
            problems.push(Violation::MissingStarter(position));
        }
        for starter in starters {
            if config.minutes(starter.player_id) == 0 {
                problems.push(Violation::StarterWithoutMinutes {
                    position,
                    player: starter.player_id,
                });
            }
        }

        let deepest = u8::try_from(depths.len()).unwrap_or(u8::MAX);
        if !depths.is_empty() && !depths.iter().copied().eq(1..=deepest) {
            problems.push(Violation::DepthNotContiguous { position, depths });
        }

        let total = config
            .depth_chart
            .iter()
            .filter(|e| e.position == position)
            .map(|e| u32::from(config.minutes(e.player_id)))
            .sum::<u32>();
        if total != u32::from(league.minutes_per_position) {
            problems.push(Violation::PositionMinutes {
                position,
                total,
                required: league.minutes_per_position,
            });
        }
    }

    let actual = config.player_minutes.values().filter(|m| **m > 0).count();
    if config.rotation_size != actual {
        problems.push(Violation::RotationSizeMismatch {
            declared: config.rotation_size,
            actual,
        });
    }
    if actual < league.min_rotation_size || actual > league.max_rotation_size {
        problems.push(Violation::RotationSizeOutOfRange {
            actual,
            min: league.min_rotation_size,
            max: league.max_rotation_size,
        });
    }

    let mut unknown = BTreeSet::new();
    let mut seen = BTreeSet::new();
    let mut twice = BTreeSet::new();
    for entry in &config.depth_chart {
        if !on_roster.contains(&entry.player_id) {
            unknown.insert(entry.player_id);
        }
        if !seen.insert(entry.player_id) {
            twice.insert(entry.player_id);
        }
    }
    for (player, minutes) in &config.player_minutes {
        if !on_roster.contains(player) {
            unknown.insert(*player);
        }
        if *minutes > league.minutes_per_position {
            problems.push(Violation::TooManyMinutes {
                player: *player,
                minutes: *minutes,
            });
        }
        if *minutes > 0 && !seen.contains(player) {
            problems.push(Violation::MinutesWithoutSlot(*player));
        }
    }
    problems.extend(unknown.into_iter().map(Violation::UnknownPlayer));
    problems.extend(twice.into_iter().map(Violation::ListedTwice));

    Violations(problems)
}
