//! Session state machine.
//!
//! # States
//! - Restoring: created, persisted state not yet read
//! - Authenticated: user and unexpired token present
//! - Anonymous: no usable session
//!
//! # State Transitions
//! ```text
//! Restoring → Authenticated: persisted token, user and future expiry found
//! Restoring → Anonymous: anything missing, unreadable or expired
//! Anonymous → Authenticated: login
//! Authenticated → Anonymous: logout, or expiry noticed on read
//! ```
//!
//! # Design Decisions
//! - Readers take a lock-free snapshot; transitions swap the whole state
//! - Transitions hold one lock across the swap and the storage write, so
//!   memory and storage never describe different sessions
//! - Expiry ends only the session that was inspected; a login that lands
//!   in between survives
//! - Expiry is checked on every read, so callers never see a stale token
//! - Persistence is the source of truth at start, memory afterwards

use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::config::SessionConfig;
use crate::models::UserInfo;
use crate::observability::metrics;
use crate::session::clock::{Clock, SystemClock};
use crate::session::storage::{FileStore, KeyValueStore, PersistenceError};

pub const TOKEN_KEY: &str = "shortly.auth.token";
pub const USER_KEY: &str = "shortly.auth.user";
pub const EXPIRY_KEY: &str = "shortly.auth.expiry";

const ALL_KEYS: [&str; 3] = [TOKEN_KEY, USER_KEY, EXPIRY_KEY];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Restoring,
    Authenticated,
    Anonymous,
}

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: UserInfo,
    pub token: String,
    /// Milliseconds since the Unix epoch.
    pub token_expiry_ms: i64,
}

impl Session {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.token_expiry_ms < now_ms
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(UserInfo),
    LoggedOut,
    Expired,
}

/// Result of [`SessionStore::refresh_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Valid,
    Expired,
    Anonymous,
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    session: Option<Session>,
}

impl SessionState {
    fn restoring() -> Self {
        Self { phase: SessionPhase::Restoring, session: None }
    }

    fn anonymous() -> Self {
        Self { phase: SessionPhase::Anonymous, session: None }
    }
}

/// Owner of the current session.
pub struct SessionStore {
    state: ArcSwap<SessionState>,
    transitions: Mutex<()>,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    window: Duration,
    events: broadcast::Sender<SessionEvent>,
    metrics_enabled: bool,
}

impl SessionStore {
    /// A store in the `Restoring` phase. Call [`restore`](Self::restore) next.
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, window: Duration) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: ArcSwap::from_pointee(SessionState::restoring()),
            transitions: Mutex::new(()),
            storage,
            clock,
            window,
            events,
            metrics_enabled: true,
        }
    }

    /// Turn session-event counters on or off.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// File-backed store on the system clock.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            Arc::new(FileStore::new(&config.storage_path)),
            Arc::new(SystemClock),
            Duration::from_secs(config.expiry_hours.saturating_mul(3600)),
        )
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.load().phase
    }

    /// Load the persisted session.
    pub fn restore(&self) -> SessionPhase {
        let now = self.clock.now_ms();
        let _transition = self.transition();
        match self.read_persisted() {
            Some(session) if !session.is_expired(now) => {
                tracing::info!(user_id = session.user.id, "Session restored");
                self.state.store(Arc::new(SessionState {
                    phase: SessionPhase::Authenticated,
                    session: Some(session),
                }));
                SessionPhase::Authenticated
            }
            found => {
                if found.is_some() {
                    tracing::info!("Persisted session expired");
                    self.record("expired");
                }
                self.clear_persisted();
                self.state.store(Arc::new(SessionState::anonymous()));
                SessionPhase::Anonymous
            }
        }
    }

    /// Persist a fresh session valid for the configured window.
    pub fn login(&self, user: UserInfo, token: String) -> Result<Session, PersistenceError> {
        let window_ms = i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX);
        let session = Session {
            token_expiry_ms: self.clock.now_ms().saturating_add(window_ms),
            user,
            token,
        };

        let user_json = serde_json::to_string(&session.user)?;
        let _transition = self.transition();
        let written = self.storage.set_many(&[
            (TOKEN_KEY, session.token.clone()),
            (USER_KEY, user_json),
            (EXPIRY_KEY, session.token_expiry_ms.to_string()),
        ]);
        if let Err(e) = written {
            tracing::error!(error = %e, "Failed to persist session");
            self.clear_persisted();
            self.state.store(Arc::new(SessionState::anonymous()));
            return Err(e);
        }

        self.state.store(Arc::new(SessionState {
            phase: SessionPhase::Authenticated,
            session: Some(session.clone()),
        }));
        tracing::info!(user_id = session.user.id, username = %session.user.username, "Logged in");
        self.record("login");
        let _ = self.events.send(SessionEvent::LoggedIn(session.user.clone()));
        Ok(session)
    }

    /// Drop the session from memory and storage. Storage errors are logged.
    pub fn logout(&self) {
        self.end(SessionEvent::LoggedOut, None);
    }

    /// Local expiry check. There is no server-side token exchange.
    pub fn refresh_token(&self) -> RefreshOutcome {
        let state = self.state.load_full();
        let Some(session) = &state.session else {
            return RefreshOutcome::Anonymous;
        };
        let now = self.clock.now_ms();
        if !session.is_expired(now) {
            return RefreshOutcome::Valid;
        }
        if self.end(SessionEvent::Expired, Some(&state)) {
            return RefreshOutcome::Expired;
        }
        match self.state.load().session.as_ref() {
            Some(newer) if !newer.is_expired(now) => RefreshOutcome::Valid,
            _ => RefreshOutcome::Anonymous,
        }
    }

    /// The live session, if any. Expires it first when its time is up.
    pub fn current(&self) -> Option<Session> {
        let state = self.state.load_full();
        let session = state.session.as_ref()?;
        let now = self.clock.now_ms();
        if !session.is_expired(now) {
            return Some(session.clone());
        }
        if self.end(SessionEvent::Expired, Some(&state)) {
            return None;
        }
        // Another transition replaced the expired session first.
        self.state.load().session.clone().filter(|s| !s.is_expired(now))
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn user(&self) -> Option<UserInfo> {
        self.current().map(|s| s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Move to `Anonymous`. With `inspected`, only if that state is still
    /// current; returns false when a newer transition got there first.
    fn end(&self, event: SessionEvent, inspected: Option<&Arc<SessionState>>) -> bool {
        let _transition = self.transition();
        let previous = self.state.load_full();
        if inspected.is_some_and(|inspected| !Arc::ptr_eq(inspected, &previous)) {
            return false;
        }
        self.state.store(Arc::new(SessionState::anonymous()));
        self.clear_persisted();

        // Only the caller that actually removed the session reports it.
        if previous.session.is_none() {
            return true;
        }
        match event {
            SessionEvent::Expired => {
                tracing::info!("Session expired");
                self.record("expired");
            }
            _ => {
                tracing::info!("Logged out");
                self.record("logout");
            }
        }
        let _ = self.events.send(event);
        true
    }

    fn transition(&self) -> MutexGuard<'_, ()> {
        self.transitions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, event: &'static str) {
        if self.metrics_enabled {
            metrics::record_session_event(event);
        }
    }

    fn read_persisted(&self) -> Option<Session> {
        let read = |key: &str| match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "Session storage unreadable");
                None
            }
        };

        let token = read(TOKEN_KEY)?;
        let user = read(USER_KEY)?;
        let expiry = read(EXPIRY_KEY)?;

        let user: UserInfo = match serde_json::from_str(&user) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Persisted user is not valid JSON");
                return None;
            }
        };
        let token_expiry_ms = match expiry.trim().parse::<i64>() {
            Ok(ms) => ms,
            Err(e) => {
                tracing::warn!(error = %e, "Persisted expiry is not a timestamp");
                return None;
            }
        };

        Some(Session { user, token, token_expiry_ms })
    }

    fn clear_persisted(&self) {
        if let Err(e) = self.storage.remove_many(&ALL_KEYS) {
            tracing::warn!(error = %e, "Failed to clear persisted session");
        }
    }
}
