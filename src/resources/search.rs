//! Keyword and tag search.

use crate::client::ShortlyClient;
use crate::error::ApiResult;
use crate::http::{endpoints, ApiRequest};
use crate::models::VideoPage;
use crate::resources::{fold, Outcome};
use crate::validation::ValidationError;

pub struct SearchClient<'a> {
    client: &'a ShortlyClient,
}

impl<'a> SearchClient<'a> {
    pub(crate) fn new(client: &'a ShortlyClient) -> Self {
        Self { client }
    }

    pub async fn by_keyword(&self, keyword: &str, page: u32, size: u32) -> ApiResult<Outcome<VideoPage>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ValidationError::Required { field: "keyword" }.into());
        }
        let endpoint = endpoints::video_search()
            .query("keyword", keyword)
            .query("page", page)
            .query("size", size);
        self.page("search.keyword", ApiRequest::get(endpoint)).await
    }

    pub async fn by_tag(&self, tag: &str, page: u32, size: u32) -> ApiResult<Outcome<VideoPage>> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(ValidationError::BlankTag.into());
        }
        let endpoint = endpoints::videos_by_tag(tag).query("page", page).query("size", size);
        self.page("search.tag", ApiRequest::get(endpoint)).await
    }

    async fn page(&self, operation: &str, request: ApiRequest) -> ApiResult<Outcome<VideoPage>> {
        let result = self.client.call(operation, request.bearer(self.client.token())).await;
        fold(operation, result, "Videos retrieved", |payload| {
            let page: VideoPage = payload.decode()?;
            for video in &page.videos {
                if let Some(liked) = video.is_liked {
                    self.client.likes.observe(video.id, liked);
                }
            }
            Ok(page)
        })
    }
}
