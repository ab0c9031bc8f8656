//! Signup, login and logout.
//!
//! Auth calls make one attempt only: replaying a rejected password three
//! times just delays the error.

use serde_json::json;

use crate::client::ShortlyClient;
use crate::error::ApiResult;
use crate::http::{endpoints, ApiRequest};
use crate::models::{AuthData, UserInfo};
use crate::resources::{fold, ignore, Outcome};
use crate::validation::{validate_email, validate_password, validate_username, ValidationError};

pub struct AuthClient<'a> {
    client: &'a ShortlyClient,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(client: &'a ShortlyClient) -> Self {
        Self { client }
    }

    pub async fn signup(&self, username: &str, email: &str, password: &str) -> ApiResult<Outcome<()>> {
        validate_username(username)?;
        validate_email(email)?;
        validate_password(password)?;

        let request = ApiRequest::post(endpoints::signup()).json(&json!({
            "username": username.trim(),
            "email": email.trim(),
            "password": password,
        }))?;
        fold("auth.signup", self.client.call_once(request).await, "Signup complete", ignore)
    }

    /// Authenticate and store the session. A storage failure is returned as
    /// `Err(ApiError::Persistence)` and leaves the client anonymous.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Outcome<UserInfo>> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ValidationError::Required { field: "password" }.into());
        }

        let request = ApiRequest::post(endpoints::login()).json(&json!({
            "email": email.trim(),
            "password": password,
        }))?;
        let outcome = fold("auth.login", self.client.call_once(request).await, "Logged in", |payload| {
            payload.decode::<AuthData>()
        })?;

        match outcome {
            Outcome::Success { message, data } => {
                self.client.reset_caches();
                let session = self.client.session.login(UserInfo::from(data.user), data.token)?;
                Ok(Outcome::Success { message, data: session.user })
            }
            Outcome::Failure { message } => Ok(Outcome::Failure { message }),
        }
    }

    /// Local only; the backend keeps no session to end.
    pub fn logout(&self) {
        self.client.session.logout();
        self.client.reset_caches();
    }

    pub fn current_user(&self) -> Option<UserInfo> {
        self.client.session.user()
    }
}
