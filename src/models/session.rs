use serde::{Deserialize, Serialize};

/// The minimal identity record the dashboard shell needs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    #[serde(alias = "_id", alias = "userId")]
    pub id: String,
    #[serde(rename = "displayName", alias = "display_name", alias = "name")]
    pub display_name: String,
    pub email: String,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        User {
            id: id.into(),
            display_name: display_name.into(),
            email: email.into(),
        }
    }
}

/// The current credential set.
///
/// A session is either fully authenticated (both tokens, optionally an
/// identity) or fully absent. The fields are private so no other shape
/// can be constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
    identity: Option<User>,
}

impl Session {
    pub fn absent() -> Self {
        Session::default()
    }

    pub fn authenticated(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        identity: Option<User>,
    ) -> Self {
        Session {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            identity,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn identity(&self) -> Option<&User> {
        self.identity.as_ref()
    }

    /// True iff both tokens are present.
    pub fn has_credentials(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    /// Same identity, new access token, and the refresh token replaced
    /// only when the provider rotated it.
    pub(crate) fn refreshed(&self, access_token: &str, rotated_refresh: Option<&str>) -> Self {
        Session {
            access_token: Some(access_token.to_string()),
            refresh_token: rotated_refresh
                .map(str::to_string)
                .or_else(|| self.refresh_token.clone()),
            identity: self.identity.clone(),
        }
    }
}
