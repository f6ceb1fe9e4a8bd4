use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    static ref USER_NAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_.]{3,}$").unwrap();
    static ref ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_\-]+$").unwrap();
}

/// Envelope for every non-data answer: `{"status": "success"|"failed", "message": ...}`.
#[derive(Debug, Serialize)]
pub struct Response {
    pub status: String,
    pub message: String,
}

impl Response {
    pub fn success(message: impl Into<String>) -> Self {
        Response {
            status: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Response {
            status: "failed".to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SportQuery {
    pub sport: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RosterRequestBody {
    #[validate(length(min = 1, message = "team1 is required"))]
    pub team1: String,
    #[validate(length(min = 1, message = "team2 is required"))]
    pub team2: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct JoinContestRequest {
    #[validate(regex(
        path = "USER_NAME_RE",
        message = "Username can be alphanumeric and must be at least 3 characters"
    ))]
    pub username: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveTeamRequest {
    #[validate(regex(
        path = "USER_NAME_RE",
        message = "Username can be alphanumeric and must be at least 3 characters"
    ))]
    pub username: String,
    #[validate(regex(path = "ID_RE", message = "Contest ID required"))]
    pub contest_id: String,
    pub selected_players: Vec<String>,
    #[validate(length(min = 1, message = "Captain is required"))]
    pub captain_id: String,
    #[validate(length(min = 1, message = "Vice-Captain is required"))]
    pub vice_captain_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_username() {
        let body = JoinContestRequest {
            username: " ".to_string(),
        };
        assert!(body.validate().is_err());
        let body = JoinContestRequest {
            username: "rahul_01".to_string(),
        };
        assert!(body.validate().is_ok());
    }
}
