//! Team-scoped endpoints: document bookmarks, invites and edit requests.
//!
//! Response parsers are standalone functions so callers can exercise them
//! without network access.

use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError, ApiResult};

/// Document projection returned by bookmark endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteDoc {
    pub id: String,
    #[serde(default)]
    pub bookmarked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocBookmarkResponse {
    pub doc: RemoteDoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamInvite {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamInviteResponse {
    pub invite: TeamInvite,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditRequestResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
struct CreateInviteBody<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

pub fn parse_doc_bookmark_response(payload: &str) -> ApiResult<DocBookmarkResponse> {
    serde_json::from_str(payload).map_err(|error| ApiError::InvalidPayload(error.to_string()))
}

pub fn parse_team_invite_response(payload: &str) -> ApiResult<TeamInviteResponse> {
    serde_json::from_str(payload).map_err(|error| ApiError::InvalidPayload(error.to_string()))
}

pub fn parse_edit_request_response(payload: &str) -> ApiResult<EditRequestResponse> {
    serde_json::from_str(payload).map_err(|error| ApiError::InvalidPayload(error.to_string()))
}

impl ApiClient {
    /// Bookmark a document for the current user.
    pub async fn create_doc_bookmark(
        &self,
        team_id: &str,
        doc_id: &str,
    ) -> ApiResult<DocBookmarkResponse> {
        let payload = self
            .post(&format!("api/teams/{team_id}/docs/{doc_id}/bookmarks"))
            .await?;
        parse_doc_bookmark_response(&payload)
    }

    /// Remove a document bookmark.
    pub async fn destroy_doc_bookmark(
        &self,
        team_id: &str,
        doc_id: &str,
    ) -> ApiResult<DocBookmarkResponse> {
        let payload = self
            .delete(&format!("api/teams/{team_id}/docs/{doc_id}/bookmarks"))
            .await?;
        parse_doc_bookmark_response(&payload)
    }

    /// Invite a member to the team.
    pub async fn create_team_invite(
        &self,
        team_id: &str,
        email: &str,
        role: Option<&str>,
    ) -> ApiResult<TeamInviteResponse> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ApiError::InvalidConfiguration(
                "Invite email must not be empty".to_string(),
            ));
        }

        let payload = self
            .post_json(
                &format!("api/teams/{team_id}/invites"),
                &CreateInviteBody { email, role },
            )
            .await?;
        parse_team_invite_response(&payload)
    }

    /// Cancel a pending team invite.
    pub async fn cancel_team_invite(&self, team_id: &str, invite_id: &str) -> ApiResult<()> {
        self.delete(&format!("api/teams/{team_id}/invites/{invite_id}"))
            .await?;
        Ok(())
    }

    /// Ask the team admins for edit access.
    pub async fn create_edit_request(&self, team_id: &str) -> ApiResult<EditRequestResponse> {
        let payload = self
            .post(&format!("api/teams/{team_id}/edit-requests"))
            .await?;
        parse_edit_request_response(&payload)
    }

    /// Withdraw a pending edit request.
    pub async fn delete_edit_request(&self, team_id: &str, request_id: &str) -> ApiResult<()> {
        self.delete(&format!("api/teams/{team_id}/edit-requests/{request_id}"))
            .await?;
        Ok(())
    }
}
