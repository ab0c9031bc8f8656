//! Video listing, likes, deletion and upload.

use std::path::Path;

use crate::client::ShortlyClient;
use crate::error::{ApiError, ApiResult};
use crate::http::{endpoints, ApiRequest, FilePart, MultipartBody};
use crate::models::{UploadRequest, VideoPage, VideoRecord};
use crate::resources::{fold, ignore, LikeState, Outcome};
use crate::validation::{validate_description, validate_tags, validate_title, validate_video_file};

pub struct VideoClient<'a> {
    client: &'a ShortlyClient,
}

impl<'a> VideoClient<'a> {
    pub(crate) fn new(client: &'a ShortlyClient) -> Self {
        Self { client }
    }

    /// One page of the public feed. Liked flags are attached when logged in.
    pub async fn list(&self, page: u32, size: u32) -> ApiResult<Outcome<VideoPage>> {
        let request = ApiRequest::get(endpoints::videos().query("page", page).query("size", size))
            .bearer(self.client.token());
        let result = self.client.call("video.list", request).await;
        fold("video.list", result, "Videos retrieved", |payload| {
            let page = payload.decode::<VideoPage>()?;
            self.observe(&page.videos);
            Ok(page)
        })
    }

    pub async fn my_videos(&self) -> ApiResult<Outcome<Vec<VideoRecord>>> {
        let token = self.client.require_token()?;
        let request = ApiRequest::get(endpoints::my_videos()).bearer(Some(token));
        let result = self.client.call("video.my_videos", request).await;
        fold("video.my_videos", result, "Videos retrieved", |p| p.decode())
    }

    pub async fn liked_videos(&self) -> ApiResult<Outcome<Vec<VideoRecord>>> {
        let token = self.client.require_token()?;
        let request = ApiRequest::get(endpoints::liked_videos()).bearer(Some(token));
        let result = self.client.call("video.liked_videos", request).await;
        fold("video.liked_videos", result, "Liked videos retrieved", |payload| {
            let videos: Vec<VideoRecord> = payload.decode()?;
            for video in &videos {
                self.client.likes.observe(video.id, true);
            }
            Ok(videos)
        })
    }

    pub async fn like(&self, video_id: i64) -> ApiResult<Outcome<LikeState>> {
        self.tap(video_id, LikeState::Liked).await
    }

    pub async fn unlike(&self, video_id: i64) -> ApiResult<Outcome<LikeState>> {
        self.tap(video_id, LikeState::NotLiked).await
    }

    /// Ask the server whether the current user likes `video_id`.
    pub async fn is_liked(&self, video_id: i64) -> ApiResult<Outcome<bool>> {
        let token = self.client.require_token()?;
        let request = ApiRequest::get(endpoints::video_is_liked(video_id)).bearer(Some(token));
        let result = self.client.call("video.is_liked", request).await;
        fold("video.is_liked", result, "Like status retrieved", |payload| {
            let liked = payload.flag(&["isLiked", "liked"]).unwrap_or(false);
            self.client.likes.observe(video_id, liked);
            Ok(liked)
        })
    }

    pub async fn delete(&self, video_id: i64) -> ApiResult<Outcome<()>> {
        let token = self.client.require_token()?;
        let request = ApiRequest::delete(endpoints::video(video_id)).bearer(Some(token));
        let result = self.client.call("video.delete", request).await;
        fold("video.delete", result, "Video deleted", ignore)
    }

    /// Upload a video as multipart form data under the upload deadline.
    pub async fn upload(&self, upload: UploadRequest) -> ApiResult<Outcome<VideoRecord>> {
        let limits = &self.client.uploads;
        validate_title(&upload.title, limits)?;
        validate_description(&upload.description, limits)?;
        validate_tags(&upload.tags, limits)?;
        validate_video_file(&upload.file_name, upload.bytes.len() as u64, limits)?;
        let token = self.client.require_token()?;

        let tags: Vec<&str> = upload.tags.iter().map(|t| t.trim()).collect();
        let tags_json = serde_json::to_string(&tags)
            .map_err(|e| ApiError::InvalidRequest(format!("tags are not serializable: {}", e)))?;

        tracing::info!(
            title = %upload.title,
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            "Uploading video"
        );

        let body = MultipartBody::default()
            .file(FilePart {
                field: "video".into(),
                file_name: upload.file_name,
                mime: upload.mime,
                bytes: upload.bytes,
            })
            .text("title", upload.title.trim())
            .text("description", upload.description.trim())
            .text("tags", tags_json);

        let request = ApiRequest::post(endpoints::videos())
            .bearer(Some(token))
            .multipart(body)
            .timeout(self.client.api.upload_timeout());
        let result = self.client.call("video.upload", request).await;
        fold("video.upload", result, "Video uploaded", |p| p.decode())
    }

    /// Absolute thumbnail URL for `video`, if it has one.
    pub fn thumbnail_url(&self, video: &VideoRecord) -> Option<url::Url> {
        let file = video.thumbnail_url.as_deref().map(file_name);
        endpoints::thumbnail_url(self.client.api.base_url(), file)
    }

    /// Absolute streaming URL for `video`.
    pub fn stream_url(&self, video: &VideoRecord) -> ApiResult<url::Url> {
        endpoints::stream_url(self.client.api.base_url(), file_name(&video.url))
    }

    async fn tap(&self, video_id: i64, target: LikeState) -> ApiResult<Outcome<LikeState>> {
        let token = self.client.require_token()?;
        let (operation, request) = match target {
            LikeState::Liked => ("video.like", ApiRequest::post(endpoints::video_like(video_id))),
            LikeState::NotLiked => ("video.unlike", ApiRequest::delete(endpoints::video_like(video_id))),
        };

        let ticket = self.client.likes.begin(video_id);
        let result = self.client.call(operation, request.bearer(Some(token))).await;
        let outcome = fold(operation, result, "Like updated", ignore);

        let succeeded = matches!(outcome, Ok(Outcome::Success { .. }));
        let mut settled = self.client.likes.complete(ticket, succeeded, target);
        if settled.needs_resync {
            if let Err(e) = self.is_liked(video_id).await {
                tracing::warn!(video_id, error = %e, "Could not re-read like state");
            }
            settled.state = self.client.likes.state(video_id);
        }
        let state = settled.state;
        outcome.map(|o| o.map(|_| state))
    }

    fn observe(&self, videos: &[VideoRecord]) {
        for video in videos {
            if let Some(liked) = video.is_liked {
                self.client.likes.observe(video.id, liked);
            }
        }
    }
}

/// Stored media paths may be full paths; the media endpoints want the name.
fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_strips_directories() {
        assert_eq!(file_name("uploads/videos/a.mp4"), "a.mp4");
        assert_eq!(file_name("a.mp4"), "a.mp4");
    }
}
