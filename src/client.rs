//! Entry point tying the HTTP client, session and per-user caches together.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::config::{ClientConfig, UploadConfig};
use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, ApiRequest, Payload};
use crate::lifecycle::Scope;
use crate::resources::{
    AuthClient, CommentClient, LikeTracker, SearchClient, SubscriptionClient, UserClient, VideoClient,
};
use crate::session::SessionStore;
use crate::validation::ValidationError;

/// Handle to the backend. Cheap to clone; clones share session and caches.
#[derive(Clone)]
pub struct ShortlyClient {
    pub(crate) api: ApiClient,
    pub(crate) session: Arc<SessionStore>,
    pub(crate) uploads: UploadConfig,
    pub(crate) likes: Arc<LikeTracker>,
    pub(crate) favorites: Arc<ArcSwap<Vec<String>>>,
    pub(crate) scope: Option<Scope>,
}

impl ShortlyClient {
    /// Build from configuration and restore the persisted session.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let api = ApiClient::new(config)?;
        let session = Arc::new(SessionStore::from_config(&config.session).with_metrics(config.observability.metrics_enabled));
        session.restore();
        Ok(Self::from_parts(api, session, config.uploads.clone()))
    }

    /// Assemble from existing parts. The session is used as-is.
    pub fn from_parts(api: ApiClient, session: Arc<SessionStore>, uploads: UploadConfig) -> Self {
        Self {
            api,
            session,
            uploads,
            likes: Arc::new(LikeTracker::new()),
            favorites: Arc::new(ArcSwap::from_pointee(Vec::new())),
            scope: None,
        }
    }

    /// A handle whose requests are abandoned once `scope` is cancelled.
    pub fn with_scope(&self, scope: Scope) -> Self {
        Self {
            scope: Some(scope),
            ..self.clone()
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn likes(&self) -> &LikeTracker {
        &self.likes
    }

    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(self)
    }

    pub fn videos(&self) -> VideoClient<'_> {
        VideoClient::new(self)
    }

    pub fn comments(&self) -> CommentClient<'_> {
        CommentClient::new(self)
    }

    pub fn user(&self) -> UserClient<'_> {
        UserClient::new(self)
    }

    pub fn search(&self) -> SearchClient<'_> {
        SearchClient::new(self)
    }

    pub fn subscriptions(&self) -> SubscriptionClient<'_> {
        SubscriptionClient::new(self)
    }

    pub(crate) fn token(&self) -> Option<String> {
        self.session.token()
    }

    pub(crate) fn require_token(&self) -> ApiResult<String> {
        self.token().ok_or(ApiError::Validation(ValidationError::LoginRequired))
    }

    /// Retried call bound to this handle's scope.
    pub(crate) async fn call(&self, operation: &str, request: ApiRequest) -> ApiResult<Payload> {
        self.api.call(operation, &request, self.scope.as_ref()).await
    }

    /// Single attempt bound to this handle's scope.
    pub(crate) async fn call_once(&self, request: ApiRequest) -> ApiResult<Payload> {
        self.api.execute(&request, self.scope.as_ref()).await
    }

    /// Drop per-user caches.
    pub(crate) fn reset_caches(&self) {
        self.likes.clear();
        self.favorites.store(Arc::new(Vec::new()));
    }
}
