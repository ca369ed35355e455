use crate::id::PlayerId;
use crate::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Position {
    PointGuard,
    ShootingGuard,
    SmallForward,
    PowerForward,
    Center,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::PointGuard,
        Position::ShootingGuard,
        Position::SmallForward,
        Position::PowerForward,
        Position::Center,
    ];

    pub fn abbreviation(self) -> &'static str {
        match self {
            Position::PointGuard => "PG",
            Position::ShootingGuard => "SG",
            Position::SmallForward => "SF",
            Position::PowerForward => "PF",
            Position::Center => "C",
        }
    }

    /// How much each attribute counts toward a player's overall at this position.
    pub fn weights(self) -> &'static Attributes<f64> {
        match self {
            Position::PointGuard => &POINT_GUARD,
            Position::ShootingGuard => &SHOOTING_GUARD,
            Position::SmallForward => &SMALL_FORWARD,
            Position::PowerForward => &POWER_FORWARD,
            Position::Center => &CENTER,
        }
    }

    /// Per-minute production shape of the position, before attributes are applied.
    pub fn tendencies(self) -> Tendencies {
        match self {
            Position::PointGuard => Tendencies {
                shots: 1.00,
                three_share: 0.40,
                rebounds: 0.55,
                assists: 1.80,
                blocks: 0.30,
                steals: 1.30,
            },
            Position::ShootingGuard => Tendencies {
                shots: 1.10,
                three_share: 0.42,
                rebounds: 0.65,
                assists: 0.90,
                blocks: 0.40,
                steals: 1.20,
            },
            Position::SmallForward => Tendencies {
                shots: 1.00,
                three_share: 0.35,
                rebounds: 0.95,
                assists: 0.75,
                blocks: 0.70,
                steals: 1.00,
            },
            Position::PowerForward => Tendencies {
                shots: 0.95,
                three_share: 0.22,
                rebounds: 1.35,
                assists: 0.55,
                blocks: 1.30,
                steals: 0.75,
            },
            Position::Center => Tendencies {
                shots: 0.90,
                three_share: 0.08,
                rebounds: 1.70,
                assists: 0.45,
                blocks: 2.00,
                steals: 0.60,
            },
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Position, String> {
        Position::ALL
            .into_iter()
            .find(|p| p.abbreviation().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown position {:?}", s))
    }
}

/// Playing style that shifts how a player's minutes turn into box-score lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum RoleArchetype {
    FloorGeneral,
    Sharpshooter,
    Slasher,
    ThreeAndD,
    StretchBig,
    RimProtector,
    GlassCleaner,
}

impl RoleArchetype {
    pub const ALL: [RoleArchetype; 7] = [
        RoleArchetype::FloorGeneral,
        RoleArchetype::Sharpshooter,
        RoleArchetype::Slasher,
        RoleArchetype::ThreeAndD,
        RoleArchetype::StretchBig,
        RoleArchetype::RimProtector,
        RoleArchetype::GlassCleaner,
    ];

    pub fn weights(self) -> &'static Attributes<f64> {
        match self {
            RoleArchetype::FloorGeneral => &FLOOR_GENERAL,
            RoleArchetype::Sharpshooter => &SHARPSHOOTER,
            RoleArchetype::Slasher => &SLASHER,
            RoleArchetype::ThreeAndD => &THREE_AND_D,
            RoleArchetype::StretchBig => &STRETCH_BIG,
            RoleArchetype::RimProtector => &RIM_PROTECTOR,
            RoleArchetype::GlassCleaner => &GLASS_CLEANER,
        }
    }

    /// Multipliers applied on top of the position's tendencies.
    pub fn adjust(self, base: Tendencies) -> Tendencies {
        let (shots, three, reb, ast, blk, stl) = match self {
            RoleArchetype::FloorGeneral => (0.95, 1.0, 1.0, 1.30, 1.0, 1.1),
            RoleArchetype::Sharpshooter => (1.05, 1.45, 0.9, 0.9, 1.0, 1.0),
            RoleArchetype::Slasher => (1.15, 0.6, 1.0, 1.0, 1.0, 1.0),
            RoleArchetype::ThreeAndD => (0.85, 1.30, 1.0, 0.9, 1.1, 1.3),
            RoleArchetype::StretchBig => (1.0, 2.5, 0.9, 1.0, 0.9, 1.0),
            RoleArchetype::RimProtector => (0.8, 0.5, 1.1, 0.9, 1.5, 1.0),
            RoleArchetype::GlassCleaner => (0.85, 0.5, 1.35, 0.9, 1.1, 1.0),
        };
        Tendencies {
            shots: base.shots * shots,
            three_share: (base.three_share * three).min(0.7),
            rebounds: base.rebounds * reb,
            assists: base.assists * ast,
            blocks: base.blocks * blk,
            steals: base.steals * stl,
        }
    }
}

/// Relative per-minute production multipliers; 1.0 is league average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tendencies {
    pub shots: f64,
    /// Fraction of field-goal attempts taken from three.
    pub three_share: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub blocks: f64,
    pub steals: f64,
}

/// Skill ratings, 0–100 for players. The same shape holds the `f64` weight tables.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Attributes<T = u8> {
    pub inside_scoring: T,
    pub mid_range: T,
    pub three_point: T,
    pub free_throw: T,
    pub passing: T,
    pub ball_handling: T,
    pub rebounding: T,
    pub perimeter_defense: T,
    pub interior_defense: T,
    pub steal: T,
    pub block: T,
    pub athleticism: T,
}

impl Attributes {
    /// Weighted mean of the ratings; the weights need not sum to one.
    pub fn weighted(&self, weights: &Attributes<f64>) -> f64 {
        let pairs = [
            (self.inside_scoring, weights.inside_scoring),
            (self.mid_range, weights.mid_range),
            (self.three_point, weights.three_point),
            (self.free_throw, weights.free_throw),
            (self.passing, weights.passing),
            (self.ball_handling, weights.ball_handling),
            (self.rebounding, weights.rebounding),
            (self.perimeter_defense, weights.perimeter_defense),
            (self.interior_defense, weights.interior_defense),
            (self.steal, weights.steal),
            (self.block, weights.block),
            (self.athleticism, weights.athleticism),
        ];
        let total: f64 = pairs.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return 0.0;
        }
        pairs
            .iter()
            .map(|(rating, w)| f64::from(*rating) * w)
            .sum::<f64>()
            / total
    }

    fn generate(rng: &mut Rng, position: Position, quality: u32) -> Attributes {
        let w = position.weights();
        // Ratings the position leans on are pulled toward `quality`, others spread wider.
        let mut roll = |weight: f64| -> u8 {
            let focus = (weight * 4.0).min(1.0);
            let base = f64::from(quality) * (0.75 + 0.25 * focus);
            let spread = f64::from(rng.range(0, 25)) - 12.0;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let rating = (base + spread).clamp(20.0, 99.0).round() as u8;
            rating
        };
        Attributes {
            inside_scoring: roll(w.inside_scoring),
            mid_range: roll(w.mid_range),
            three_point: roll(w.three_point),
            free_throw: roll(w.free_throw),
            passing: roll(w.passing),
            ball_handling: roll(w.ball_handling),
            rebounding: roll(w.rebounding),
            perimeter_defense: roll(w.perimeter_defense),
            interior_defense: roll(w.interior_defense),
            steal: roll(w.steal),
            block: roll(w.block),
            athleticism: roll(w.athleticism),
        }
    }
}

macro_rules! weights {
    ($($field:ident: $value:expr),* $(,)?) => {
        Attributes {
            $($field: $value,)*
        }
    };
}

static POINT_GUARD: Attributes<f64> = weights! {
    inside_scoring: 0.06, mid_range: 0.10, three_point: 0.14, free_throw: 0.05,
    passing: 0.20, ball_handling: 0.18, rebounding: 0.02, perimeter_defense: 0.10,
    interior_defense: 0.01, steal: 0.07, block: 0.01, athleticism: 0.06,
};
static SHOOTING_GUARD: Attributes<f64> = weights! {
    inside_scoring: 0.10, mid_range: 0.15, three_point: 0.20, free_throw: 0.07,
    passing: 0.08, ball_handling: 0.10, rebounding: 0.03, perimeter_defense: 0.12,
    interior_defense: 0.02, steal: 0.06, block: 0.01, athleticism: 0.06,
};
static SMALL_FORWARD: Attributes<f64> = weights! {
    inside_scoring: 0.14, mid_range: 0.13, three_point: 0.13, free_throw: 0.05,
    passing: 0.07, ball_handling: 0.07, rebounding: 0.08, perimeter_defense: 0.12,
    interior_defense: 0.06, steal: 0.05, block: 0.03, athleticism: 0.07,
};
static POWER_FORWARD: Attributes<f64> = weights! {
    inside_scoring: 0.20, mid_range: 0.10, three_point: 0.05, free_throw: 0.04,
    passing: 0.04, ball_handling: 0.03, rebounding: 0.18, perimeter_defense: 0.05,
    interior_defense: 0.15, steal: 0.02, block: 0.08, athleticism: 0.06,
};
static CENTER: Attributes<f64> = weights! {
    inside_scoring: 0.22, mid_range: 0.04, three_point: 0.02, free_throw: 0.03,
    passing: 0.04, ball_handling: 0.02, rebounding: 0.22, perimeter_defense: 0.02,
    interior_defense: 0.20, steal: 0.02, block: 0.13, athleticism: 0.04,
};

static FLOOR_GENERAL: Attributes<f64> = weights! {
    inside_scoring: 0.0, mid_range: 0.1, three_point: 0.1, free_throw: 0.0,
    passing: 0.45, ball_handling: 0.35, rebounding: 0.0, perimeter_defense: 0.0,
    interior_defense: 0.0, steal: 0.0, block: 0.0, athleticism: 0.0,
};
static SHARPSHOOTER: Attributes<f64> = weights! {
    inside_scoring: 0.0, mid_range: 0.25, three_point: 0.6, free_throw: 0.15,
    passing: 0.0, ball_handling: 0.0, rebounding: 0.0, perimeter_defense: 0.0,
    interior_defense: 0.0, steal: 0.0, block: 0.0, athleticism: 0.0,
};
static SLASHER: Attributes<f64> = weights! {
    inside_scoring: 0.5, mid_range: 0.0, three_point: 0.0, free_throw: 0.1,
    passing: 0.0, ball_handling: 0.2, rebounding: 0.0, perimeter_defense: 0.0,
    interior_defense: 0.0, steal: 0.0, block: 0.0, athleticism: 0.2,
};
static THREE_AND_D: Attributes<f64> = weights! {
    inside_scoring: 0.0, mid_range: 0.0, three_point: 0.45, free_throw: 0.0,
    passing: 0.0, ball_handling: 0.0, rebounding: 0.0, perimeter_defense: 0.4,
    interior_defense: 0.0, steal: 0.15, block: 0.0, athleticism: 0.0,
};
static STRETCH_BIG: Attributes<f64> = weights! {
    inside_scoring: 0.15, mid_range: 0.2, three_point: 0.4, free_throw: 0.0,
    passing: 0.0, ball_handling: 0.0, rebounding: 0.15, perimeter_defense: 0.0,
    interior_defense: 0.1, steal: 0.0, block: 0.0, athleticism: 0.0,
};
static RIM_PROTECTOR: Attributes<f64> = weights! {
    inside_scoring: 0.0, mid_range: 0.0, three_point: 0.0, free_throw: 0.0,
    passing: 0.0, ball_handling: 0.0, rebounding: 0.2, perimeter_defense: 0.0,
    interior_defense: 0.4, steal: 0.0, block: 0.4, athleticism: 0.0,
};
static GLASS_CLEANER: Attributes<f64> = weights! {
    inside_scoring: 0.2, mid_range: 0.0, three_point: 0.0, free_throw: 0.0,
    passing: 0.0, ball_handling: 0.0, rebounding: 0.6, perimeter_defense: 0.0,
    interior_defense: 0.1, steal: 0.0, block: 0.0, athleticism: 0.1,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub age: u8,
    pub position: Position,
    pub role: Option<RoleArchetype>,
    pub attributes: Attributes,
}

impl Player {
    pub fn new(id: PlayerId, name: String, position: Position, attributes: Attributes) -> Player {
        Player {
            id,
            name,
            age: 25,
            position,
            role: None,
            attributes,
        }
    }

    /// Builds a player around `quality` (roughly the overall they end up with).
    pub fn generate(rng: &mut Rng, name: String, position: Position, quality: u32) -> Player {
        let attributes = Attributes::generate(rng, position, quality);
        let id = PlayerId::generate(rng);
        let age = u8::try_from(rng.range(19, 36)).unwrap_or(25);
        let mut player = Player {
            id,
            name,
            age,
            position,
            role: None,
            attributes,
        };
        player.role = Some(player.best_role());
        player
    }

    /// Overall rating at the player's listed position.
    pub fn overall(&self) -> f64 {
        self.overall_at(self.position)
    }

    pub fn overall_at(&self, position: Position) -> f64 {
        self.attributes.weighted(position.weights())
    }

    /// How well the player's ratings suit `role`, on the 0–100 scale.
    pub fn role_fit(&self, role: RoleArchetype) -> f64 {
        self.attributes.weighted(role.weights())
    }

    pub fn best_role(&self) -> RoleArchetype {
        RoleArchetype::ALL
            .into_iter()
            .max_by(|a, b| self.role_fit(*a).total_cmp(&self.role_fit(*b)))
            .unwrap_or(RoleArchetype::ThreeAndD)
    }

    /// Production shape at `position`, bent by the player's role if one is set.
    pub fn tendencies_at(&self, position: Position) -> Tendencies {
        let base = position.tendencies();
        match self.role {
            Some(role) => role.adjust(base),
            None => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Attributes, Player, Position, RoleArchetype};
    use crate::id::PlayerId;
    use crate::Rng;

    fn shooter() -> Player {
        Player::new(
            PlayerId::new(),
            "Sure Shot".into(),
            Position::ShootingGuard,
            Attributes {
                three_point: 95,
                mid_range: 85,
                free_throw: 90,
                inside_scoring: 40,
                rebounding: 30,
                block: 20,
                interior_defense: 25,
                ..Attributes::default()
            },
        )
    }

    #[test]
    fn positions_parse_from_abbreviations() {
        for position in Position::ALL {
            assert_eq!(position.abbreviation().parse::<Position>(), Ok(position));
        }
        assert_eq!("pf".parse::<Position>(), Ok(Position::PowerForward));
        assert!("QB".parse::<Position>().is_err());
    }

    #[test]
    fn overall_follows_position_weights() {
        let player = shooter();
        assert!(player.overall_at(Position::ShootingGuard) > player.overall_at(Position::Center));
    }

    #[test]
    fn best_role_matches_strengths() {
        assert_eq!(shooter().best_role(), RoleArchetype::Sharpshooter);
    }

    #[test]
    fn role_shifts_three_point_share() {
        let mut player = shooter();
        let plain = player.tendencies_at(Position::ShootingGuard);
        player.role = Some(RoleArchetype::Sharpshooter);
        let bent = player.tendencies_at(Position::ShootingGuard);
        assert!(bent.three_share > plain.three_share);
    }

    #[test]
    fn generated_ratings_stay_in_range() {
        let mut rng = Rng::seeded(5, 5);
        for position in Position::ALL {
            let player = Player::generate(&mut rng, "Gen".into(), position, 70);
            assert!((19..36).contains(&player.age));
            assert!(player.role.is_some());
            assert!((40.0..=99.0).contains(&player.overall()));
        }
    }
}
