use crate::id::TeamId;
use crate::{Conference, Game, Team};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TeamRecord {
    pub team_id: TeamId,
    pub name: String,
    pub conference: Conference,
    pub division: u8,
    pub wins: u16,
    pub losses: u16,
}

impl TeamRecord {
    pub fn games(&self) -> u16 {
        self.wins + self.losses
    }

    pub fn win_pct(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            n => f64::from(self.wins) / f64::from(n),
        }
    }

    /// Wins, then win percentage, then name. Seeding and the standings table both sort by this,
    /// so they never disagree.
    pub fn rank_cmp(&self, other: &TeamRecord) -> Ordering {
        other
            .wins
            .cmp(&self.wins)
            .then_with(|| other.win_pct().total_cmp(&self.win_pct()))
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.team_id.cmp(&other.team_id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Standings {
    pub records: BTreeMap<TeamId, TeamRecord>,
}

impl Standings {
    /// Tallies every played game between known teams. Games involving unknown teams are skipped;
    /// `GameState::check_consistency` is where those get reported.
    pub fn from_games<'a, I>(teams: I, games: &[Game]) -> Standings
    where
        I: IntoIterator<Item = &'a Team>,
    {
        let mut records = teams
            .into_iter()
            .map(|team| {
                (
                    team.id,
                    TeamRecord {
                        team_id: team.id,
                        name: team.full_name(),
                        conference: team.conference,
                        division: team.division,
                        wins: 0,
                        losses: 0,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        for game in games {
            let (Some(winner), Some(loser)) = (game.winner(), game.loser()) else {
                continue;
            };
            if !records.contains_key(&winner) || !records.contains_key(&loser) {
                continue;
            }
            if let Some(record) = records.get_mut(&winner) {
                record.wins += 1;
            }
            if let Some(record) = records.get_mut(&loser) {
                record.losses += 1;
            }
        }
        Standings { records }
    }

    pub fn record(&self, team: TeamId) -> Option<&TeamRecord> {
        self.records.get(&team)
    }

    /// The conference table, best first.
    pub fn conference(&self, conference: Conference) -> Vec<&TeamRecord> {
        let mut table = self
            .records
            .values()
            .filter(|r| r.conference == conference)
            .collect::<Vec<_>>();
        table.sort_by(|a, b| a.rank_cmp(b));
        table
    }

    /// Every team, best first.
    pub fn league(&self) -> Vec<&TeamRecord> {
        let mut table = self.records.values().collect::<Vec<_>>();
        table.sort_by(|a, b| a.rank_cmp(b));
        table
    }
}
