//! Endpoint registry.
//!
//! Static mapping from logical operation to URL path template. Path
//! parameters are percent-encoded as whole segments when the endpoint is
//! resolved against the configured base URL.

use url::Url;

use crate::error::{ApiError, ApiResult};

/// A resolved-on-demand backend location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    template: &'static str,
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl Endpoint {
    /// An endpoint without path parameters.
    pub fn new(template: &'static str) -> Self {
        Self::from_template(template, &[])
    }

    /// Fill `{...}` placeholders in `template` with `params`, in order.
    pub fn from_template(template: &'static str, params: &[&str]) -> Self {
        let mut params = params.iter();
        let segments = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.starts_with('{') && s.ends_with('}') {
                    params.next().map(|p| p.to_string()).unwrap_or_default()
                } else {
                    s.to_string()
                }
            })
            .collect();

        Self {
            template,
            segments,
            query: Vec::new(),
        }
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// The path template, used as a low-cardinality label.
    pub fn template(&self) -> &'static str {
        self.template
    }

    /// The concrete (unencoded) path, for logging.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Join this endpoint onto `base`, keeping the base path as a prefix.
    pub fn resolve(&self, base: &Url) -> ApiResult<Url> {
        let mut url = base.clone();
        url.set_query(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidRequest(format!("base URL '{}' cannot be a base", base)))?;
            segments.pop_if_empty();
            segments.extend(&self.segments);
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

pub fn signup() -> Endpoint {
    Endpoint::new("/auth/signup")
}

pub fn login() -> Endpoint {
    Endpoint::new("/auth/login")
}

/// `GET` lists all videos, `POST` uploads one.
pub fn videos() -> Endpoint {
    Endpoint::new("/videos")
}

pub fn my_videos() -> Endpoint {
    Endpoint::new("/videos/my-videos")
}

pub fn liked_videos() -> Endpoint {
    Endpoint::new("/videos/liked-videos")
}

pub fn video(id: i64) -> Endpoint {
    Endpoint::from_template("/videos/{id}", &[&id.to_string()])
}

pub fn video_like(id: i64) -> Endpoint {
    Endpoint::from_template("/videos/{id}/like", &[&id.to_string()])
}

pub fn video_is_liked(id: i64) -> Endpoint {
    Endpoint::from_template("/videos/{id}/is-liked", &[&id.to_string()])
}

pub fn video_search() -> Endpoint {
    Endpoint::new("/videos/search")
}

pub fn videos_by_tag(tag: &str) -> Endpoint {
    Endpoint::from_template("/videos/tag/{tag}", &[tag])
}

pub fn video_thumbnail(file: &str) -> Endpoint {
    Endpoint::from_template("/videos/thumbnail/{file}", &[file])
}

pub fn video_file(file: &str) -> Endpoint {
    Endpoint::from_template("/videos/file/{file}", &[file])
}

pub fn change_password() -> Endpoint {
    Endpoint::new("/user/change-password")
}

pub fn favorite_tags() -> Endpoint {
    Endpoint::new("/user/favorites/tags")
}

pub fn favorite_tag(tag: &str) -> Endpoint {
    Endpoint::from_template("/user/favorites/tags/{tag}", &[tag])
}

pub fn comments() -> Endpoint {
    Endpoint::new("/comments")
}

pub fn comment(id: i64) -> Endpoint {
    Endpoint::from_template("/comments/{id}", &[&id.to_string()])
}

pub fn video_comments(video_id: i64) -> Endpoint {
    Endpoint::from_template("/comments/video/{id}", &[&video_id.to_string()])
}

pub fn subscription(creator_id: i64) -> Endpoint {
    Endpoint::from_template("/subscriptions/{creatorId}", &[&creator_id.to_string()])
}

pub fn subscription_status(creator_id: i64) -> Endpoint {
    Endpoint::from_template("/subscriptions/{creatorId}/status", &[&creator_id.to_string()])
}

pub fn subscribed_videos() -> Endpoint {
    Endpoint::new("/subscriptions/videos")
}

pub fn subscribed_creators() -> Endpoint {
    Endpoint::new("/subscriptions/creators")
}

/// Absolute thumbnail URL for a stored thumbnail name, if there is one.
pub fn thumbnail_url(base: &Url, file: Option<&str>) -> Option<Url> {
    let file = file.filter(|f| !f.is_empty())?;
    video_thumbnail(file).resolve(base).ok()
}

/// Absolute streaming URL for a stored video name.
pub fn stream_url(base: &Url, file: &str) -> ApiResult<Url> {
    video_file(file).resolve(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://192.168.0.18:8080/api").unwrap()
    }

    #[test]
    fn test_resolve_keeps_api_prefix() {
        let url = login().resolve(&base()).unwrap();
        assert_eq!(url.as_str(), "http://192.168.0.18:8080/api/auth/login");

        let trailing = Url::parse("http://host/api/").unwrap();
        assert_eq!(video_like(7).resolve(&trailing).unwrap().as_str(), "http://host/api/videos/7/like");
    }

    #[test]
    fn test_tag_is_encoded_as_one_segment() {
        let endpoint = videos_by_tag("cats & dogs/2");
        assert_eq!(endpoint.template(), "/videos/tag/{tag}");
        let url = endpoint.resolve(&base()).unwrap();
        assert_eq!(url.path(), "/api/videos/tag/cats%20&%20dogs%2F2");
    }

    #[test]
    fn test_query_pairs() {
        let url = video_search()
            .query("keyword", "funny cat")
            .query("page", 0)
            .query("size", 20)
            .resolve(&base())
            .unwrap();
        assert_eq!(url.query(), Some("keyword=funny+cat&page=0&size=20"));
    }

    #[test]
    fn test_media_urls() {
        assert!(thumbnail_url(&base(), None).is_none());
        assert!(thumbnail_url(&base(), Some("")).is_none());
        assert_eq!(
            thumbnail_url(&base(), Some("a.jpg")).unwrap().as_str(),
            "http://192.168.0.18:8080/api/videos/thumbnail/a.jpg"
        );
        assert_eq!(
            stream_url(&base(), "v.mp4").unwrap().as_str(),
            "http://192.168.0.18:8080/api/videos/file/v.mp4"
        );
    }

    #[test]
    fn test_path_for_logging() {
        assert_eq!(subscription_status(3).path(), "/subscriptions/3/status");
        assert_eq!(favorite_tag("rust").path(), "/user/favorites/tags/rust");
    }
}
