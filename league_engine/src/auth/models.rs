//! Caller identity models.

use serde::{Deserialize, Serialize};

use crate::errors::{LeagueError, LeagueResult};
use crate::team::models::TeamId;

/// User ID type
pub type UserId = i64;

/// Caller role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Captain,
}

/// Authenticated caller, passed explicitly into every engine operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: UserId,
    pub role: Role,
    /// Team a captain leads
    pub team_id: Option<TeamId>,
}

impl AuthContext {
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
            team_id: None,
        }
    }

    pub fn captain(user_id: UserId, team_id: TeamId) -> Self {
        Self {
            user_id,
            role: Role::Captain,
            team_id: Some(team_id),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> LeagueResult<()> {
        if !self.is_admin() {
            return Err(LeagueError::Forbidden("admins only"));
        }
        Ok(())
    }

    /// Team the caller captains
    pub fn require_captain(&self) -> LeagueResult<TeamId> {
        match (self.role, self.team_id) {
            (Role::Captain, Some(team_id)) => Ok(team_id),
            (Role::Captain, None) => Err(LeagueError::Forbidden("no team assigned")),
            _ => Err(LeagueError::Forbidden("captains only")),
        }
    }
}

/// JWT claims for access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: UserId,
    pub role: Role,
    pub team_id: Option<TeamId>,
    pub exp: i64,
    pub iat: i64,
}

impl From<AccessTokenClaims> for AuthContext {
    fn from(claims: AccessTokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            team_id: claims.team_id,
        }
    }
}
