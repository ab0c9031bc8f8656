//! Account settings and favorite tags.
//!
//! The favorite-tag list is cached as an immutable snapshot: a fetch
//! replaces it, a successful add or remove edits it, and readers never block.

use serde_json::json;
use std::sync::Arc;

use crate::client::ShortlyClient;
use crate::error::ApiResult;
use crate::http::{endpoints, ApiRequest};
use crate::resources::{fold, ignore, Outcome};
use crate::validation::{validate_password, ValidationError};

pub struct UserClient<'a> {
    client: &'a ShortlyClient,
}

impl<'a> UserClient<'a> {
    pub(crate) fn new(client: &'a ShortlyClient) -> Self {
        Self { client }
    }

    pub async fn change_password(&self, current: &str, new: &str) -> ApiResult<Outcome<()>> {
        if current.is_empty() {
            return Err(ValidationError::Required { field: "currentPassword" }.into());
        }
        validate_password(new)?;
        let token = self.client.require_token()?;

        let request = ApiRequest::post(endpoints::change_password())
            .bearer(Some(token))
            .json(&json!({ "currentPassword": current, "newPassword": new }))?;
        let result = self.client.call("user.change_password", request).await;
        fold("user.change_password", result, "Password changed", ignore)
    }

    /// Fetch favorite tags and refresh the cached snapshot.
    pub async fn favorite_tags(&self) -> ApiResult<Outcome<Vec<String>>> {
        let token = self.client.require_token()?;
        let request = ApiRequest::get(endpoints::favorite_tags()).bearer(Some(token));
        let result = self.client.call("user.favorite_tags", request).await;
        fold("user.favorite_tags", result, "Favorite tags retrieved", |payload| {
            let tags: Vec<String> = payload.decode()?;
            self.client.favorites.store(Arc::new(tags.clone()));
            Ok(tags)
        })
    }

    pub async fn add_favorite_tag(&self, tag: &str) -> ApiResult<Outcome<()>> {
        let tag = normalize_tag(tag)?;
        let token = self.client.require_token()?;
        let request = ApiRequest::post(endpoints::favorite_tags().query("tagName", &tag)).bearer(Some(token));
        let result = self.client.call("user.add_favorite_tag", request).await;
        let outcome = fold("user.add_favorite_tag", result, "Tag added to favorites", ignore)?;

        if outcome.is_success() {
            self.client.favorites.rcu(|tags| {
                let mut tags = Vec::clone(tags);
                if !tags.contains(&tag) {
                    tags.push(tag.clone());
                }
                tags
            });
        }
        Ok(outcome)
    }

    pub async fn remove_favorite_tag(&self, tag: &str) -> ApiResult<Outcome<()>> {
        let tag = normalize_tag(tag)?;
        let token = self.client.require_token()?;
        let request = ApiRequest::delete(endpoints::favorite_tag(&tag)).bearer(Some(token));
        let result = self.client.call("user.remove_favorite_tag", request).await;
        let outcome = fold("user.remove_favorite_tag", result, "Tag removed from favorites", ignore)?;

        if outcome.is_success() {
            self.client
                .favorites
                .rcu(|tags| tags.iter().filter(|t| *t != &tag).cloned().collect::<Vec<_>>());
        }
        Ok(outcome)
    }

    /// Last known favorite tags, without a network call.
    pub fn cached_favorite_tags(&self) -> Arc<Vec<String>> {
        self.client.favorites.load_full()
    }
}

fn normalize_tag(tag: &str) -> Result<String, ValidationError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(ValidationError::BlankTag);
    }
    Ok(tag.to_string())
}
