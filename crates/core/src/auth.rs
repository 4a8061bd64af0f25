use serde::{Deserialize, Serialize};

use crate::{TeamId, UserId};

/// Caller information carried by the surrounding web or service layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
    display_name: String,
    email: Option<String>,
    current_team_id: Option<TeamId>,
}

impl UserIdentity {
    /// Creates a caller identity from authentication and team selection data.
    #[must_use]
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        email: Option<String>,
        current_team_id: Option<TeamId>,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email,
            current_team_id,
        }
    }

    /// Returns the authenticated user identifier.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the session carries one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the team currently selected by the caller.
    #[must_use]
    pub fn current_team_id(&self) -> Option<&TeamId> {
        self.current_team_id.as_ref()
    }

    /// Returns a copy of this identity with another team selected.
    #[must_use]
    pub fn with_current_team(mut self, team_id: Option<TeamId>) -> Self {
        self.current_team_id = team_id;
        self
    }
}
