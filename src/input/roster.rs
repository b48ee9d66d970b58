use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RosterEntry {
    pub team_id: String,
    pub cash: i64,
}

/// Teams and their starting cash, in load order. Consumed once to initialize the ledger.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add_team(&mut self, team_id: impl Into<String>, cash: i64) {
        self.entries.push(RosterEntry {
            team_id: team_id.into(),
            cash,
        });
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::Roster;

    #[test]
    fn test_that_teams_are_kept_in_load_order() {
        let mut roster = Roster::new();
        roster.add_team("T2", 10_000);
        roster.add_team("T1", 10_000);

        let ids: Vec<&str> = roster.entries().iter().map(|e| e.team_id.as_str()).collect();
        assert_eq!(ids, vec!["T2", "T1"]);
    }
}
