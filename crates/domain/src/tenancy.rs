//! Team scoping for team-owned records.

use warden_core::TeamId;

/// Record owned by exactly one team.
pub trait TeamOwned {
    /// Returns the owning team.
    fn team_id(&self) -> &TeamId;
}

/// Keeps only the records owned by `team_id`.
///
/// Without a team context nothing is returned; a missing team is never read
/// as unscoped access.
pub fn scope_to_team<T, I>(records: I, team_id: Option<&TeamId>) -> Vec<T>
where
    T: TeamOwned,
    I: IntoIterator<Item = T>,
{
    let Some(team_id) = team_id else {
        return Vec::new();
    };

    records
        .into_iter()
        .filter(|record| record.team_id() == team_id)
        .collect()
}
