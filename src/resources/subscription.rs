//! Creator subscriptions.

use crate::client::ShortlyClient;
use crate::error::ApiResult;
use crate::http::{endpoints, ApiRequest};
use crate::models::Creator;
use crate::resources::{fold, ignore, Outcome};

pub struct SubscriptionClient<'a> {
    client: &'a ShortlyClient,
}

impl<'a> SubscriptionClient<'a> {
    pub(crate) fn new(client: &'a ShortlyClient) -> Self {
        Self { client }
    }

    pub async fn subscribe(&self, creator_id: i64) -> ApiResult<Outcome<()>> {
        let token = self.client.require_token()?;
        let request = ApiRequest::post(endpoints::subscription(creator_id)).bearer(Some(token));
        let result = self.client.call("subscription.subscribe", request).await;
        fold("subscription.subscribe", result, "Subscribed", ignore)
    }

    pub async fn unsubscribe(&self, creator_id: i64) -> ApiResult<Outcome<()>> {
        let token = self.client.require_token()?;
        let request = ApiRequest::delete(endpoints::subscription(creator_id)).bearer(Some(token));
        let result = self.client.call("subscription.unsubscribe", request).await;
        fold("subscription.unsubscribe", result, "Unsubscribed", ignore)
    }

    pub async fn status(&self, creator_id: i64) -> ApiResult<Outcome<bool>> {
        let token = self.client.require_token()?;
        let request = ApiRequest::get(endpoints::subscription_status(creator_id)).bearer(Some(token));
        let result = self.client.call("subscription.status", request).await;
        fold("subscription.status", result, "Subscription status retrieved", |payload| {
            Ok(payload.flag(&["isSubscribed", "subscribed"]).unwrap_or(false))
        })
    }

    /// IDs of subscribed creators. The backend serves these from
    /// `/subscriptions/videos`.
    pub async fn subscribed_creator_ids(&self) -> ApiResult<Outcome<Vec<i64>>> {
        let token = self.client.require_token()?;
        let request = ApiRequest::get(endpoints::subscribed_videos()).bearer(Some(token));
        let result = self.client.call("subscription.creator_ids", request).await;
        fold("subscription.creator_ids", result, "Subscriptions retrieved", |p| p.decode())
    }

    pub async fn subscribed_creators(&self) -> ApiResult<Outcome<Vec<Creator>>> {
        let token = self.client.require_token()?;
        let request = ApiRequest::get(endpoints::subscribed_creators()).bearer(Some(token));
        let result = self.client.call("subscription.creators", request).await;
        fold("subscription.creators", result, "Subscribed creators retrieved", |p| p.decode())
    }
}
