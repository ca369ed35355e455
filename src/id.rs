macro_rules! id {
    ($name:ident, $variant:ident, $field:ident, $ty:ty) => {
        id!($name);

        // A dangling id is a data-integrity failure upstream (usually a roster edit), so it is
        // surfaced to the caller instead of panicking. See `GameState::check_consistency`.
        impl $name {
            pub fn load(self, league: &$crate::League) -> $crate::Result<&$ty> {
                league
                    .$field
                    .get(&self)
                    .ok_or($crate::Error::$variant(self))
            }
        }
    };

    ($name:ident) => {
        #[derive(
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Deserialize,
            ::serde::Serialize,
        )]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(pub ::uuid::Uuid);

        impl $name {
            pub fn new() -> $name {
                $name(::uuid::Uuid::new_v4())
            }

            /// Draws the id from the sim `Rng`, so seeded runs hand out the same ids.
            pub fn generate(rng: &mut $crate::Rng) -> $name {
                let mut bytes = [0; 16];
                for chunk in bytes.chunks_mut(4) {
                    chunk.copy_from_slice(&rng.next_u32().to_le_bytes());
                }
                $name(::uuid::Builder::from_random_bytes(bytes).into_uuid())
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Debug::fmt(&self.0, f)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> Result<$name, ::uuid::Error> {
                ::std::str::FromStr::from_str(s).map($name)
            }
        }
    };
}

id!(GameId);
id!(PlayerId);
id!(SeasonId);
id!(SeriesId);
id!(TeamId, MissingTeam, teams, crate::Team);

#[cfg(test)]
mod tests {
    use super::{GameId, TeamId};
    use crate::{Error, League, Rng};

    #[test]
    fn generated_ids_follow_the_seed() {
        let a = GameId::generate(&mut Rng::seeded(7, 11));
        let b = GameId::generate(&mut Rng::seeded(7, 11));
        let c = GameId::generate(&mut Rng::seeded(7, 12));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.0.is_nil());
    }

    #[test]
    fn loading_unknown_team_is_an_error() {
        let league = League::default();
        let id = TeamId::new();
        assert!(matches!(id.load(&league), Err(Error::MissingTeam(missing)) if missing == id));
    }

    #[test]
    fn parses_what_it_prints() {
        let id = TeamId::new();
        assert_eq!(id.to_string().parse::<TeamId>().unwrap(), id);
    }
}
