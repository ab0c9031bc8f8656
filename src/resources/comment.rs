//! Comments on videos.

use serde_json::json;

use crate::client::ShortlyClient;
use crate::error::ApiResult;
use crate::http::{endpoints, ApiRequest};
use crate::models::CommentRecord;
use crate::resources::{fold, ignore, Outcome};
use crate::validation::validate_comment;

pub struct CommentClient<'a> {
    client: &'a ShortlyClient,
}

impl<'a> CommentClient<'a> {
    pub(crate) fn new(client: &'a ShortlyClient) -> Self {
        Self { client }
    }

    /// Comments on `video_id`. Ownership flags need a token; listing does not.
    pub async fn list(&self, video_id: i64) -> ApiResult<Outcome<Vec<CommentRecord>>> {
        let request = ApiRequest::get(endpoints::video_comments(video_id)).bearer(self.client.token());
        let result = self.client.call("comment.list", request).await;
        fold("comment.list", result, "Comments retrieved", |p| p.decode())
    }

    pub async fn create(&self, video_id: i64, content: &str) -> ApiResult<Outcome<CommentRecord>> {
        validate_comment(content)?;
        let token = self.client.require_token()?;
        let request = ApiRequest::post(endpoints::comments())
            .bearer(Some(token))
            .json(&json!({ "content": content.trim(), "videoId": video_id }))?;
        let result = self.client.call("comment.create", request).await;
        fold("comment.create", result, "Comment posted", |p| p.decode())
    }

    pub async fn update(&self, comment_id: i64, video_id: i64, content: &str) -> ApiResult<Outcome<CommentRecord>> {
        validate_comment(content)?;
        let token = self.client.require_token()?;
        let request = ApiRequest::put(endpoints::comment(comment_id))
            .bearer(Some(token))
            .json(&json!({ "content": content.trim(), "videoId": video_id }))?;
        let result = self.client.call("comment.update", request).await;
        fold("comment.update", result, "Comment updated", |p| p.decode())
    }

    pub async fn delete(&self, comment_id: i64) -> ApiResult<Outcome<()>> {
        let token = self.client.require_token()?;
        let request = ApiRequest::delete(endpoints::comment(comment_id)).bearer(Some(token));
        let result = self.client.call("comment.delete", request).await;
        fold("comment.delete", result, "Comment deleted", ignore)
    }
}
