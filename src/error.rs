//! Error types for the season core

use crate::id::{GameId, PlayerId, TeamId};
use crate::rotation::Violations;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid league configuration: {reason}")]
    Configuration { reason: String },

    #[error("rotation rejected:\n{0}")]
    InvalidRotation(Violations),

    #[error("invalid state transition: {reason}")]
    InvalidStateTransition { reason: String },

    #[error("team {0} not found")]
    MissingTeam(TeamId),

    #[error("player {0} not found")]
    MissingPlayer(PlayerId),

    #[error("game {0} not found")]
    MissingGame(GameId),

    #[error("game {0} was already recorded")]
    GameAlreadyRecorded(GameId),
}

impl Error {
    pub(crate) fn configuration(reason: impl Into<String>) -> Error {
        Error::Configuration {
            reason: reason.into(),
        }
    }

    pub(crate) fn transition(reason: impl Into<String>) -> Error {
        Error::InvalidStateTransition {
            reason: reason.into(),
        }
    }

    /// Data-integrity failures point at a bug in whatever edited the roster.
    pub fn is_missing_reference(&self) -> bool {
        matches!(
            self,
            Error::MissingTeam(_) | Error::MissingPlayer(_) | Error::MissingGame(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::id::{PlayerId, TeamId};
    use crate::rotation::{Violation, Violations};
    use crate::Position;

    #[test]
    fn messages_name_the_problem() {
        let err = Error::configuration("need at least two teams");
        assert_eq!(
            err.to_string(),
            "invalid league configuration: need at least two teams"
        );

        let err = Error::InvalidRotation(Violations(vec![Violation::MissingStarter(
            Position::Center,
        )]));
        assert!(err.to_string().contains("C"));
    }

    #[test]
    fn missing_references_are_flagged() {
        assert!(Error::MissingTeam(TeamId::new()).is_missing_reference());
        assert!(Error::MissingPlayer(PlayerId::new()).is_missing_reference());
        assert!(!Error::transition("nope").is_missing_reference());
    }
}
