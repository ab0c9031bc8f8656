//! Per-video like state.
//!
//! # States
//! - NotLiked
//! - Liked
//!
//! # State Transitions
//! ```text
//! NotLiked → Liked: like request succeeded and is the latest tap
//! Liked → NotLiked: unlike request succeeded and is the latest tap
//! ```
//!
//! # Design Decisions
//! - Every tap takes a ticket with a fresh generation; only the latest
//!   ticket for a video may change its state, so a slow response from an
//!   earlier tap is dropped
//! - Server observations (listings, is-liked checks) never override a tap
//!   still in flight
//! - If the latest tap failed while an earlier tap succeeded, the server
//!   holds the earlier tap's state; the last tap to settle asks for a resync

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum LikeState {
    #[default]
    NotLiked,
    Liked,
}

impl LikeState {
    pub fn from_liked(liked: bool) -> Self {
        if liked {
            LikeState::Liked
        } else {
            LikeState::NotLiked
        }
    }

    pub fn is_liked(self) -> bool {
        self == LikeState::Liked
    }
}

/// Proof of one tap; hand it back to [`LikeTracker::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeTicket {
    pub video_id: i64,
    generation: u64,
}

/// Local state once a tap has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub state: LikeState,
    /// Local state may disagree with the server; re-read it.
    pub needs_resync: bool,
}

#[derive(Debug, Default)]
struct Entry {
    state: LikeState,
    latest: u64,
    pending: u32,
    latest_failed: bool,
    superseded_success: bool,
}

impl Entry {
    fn in_flight(&self) -> bool {
        self.pending > 0
    }
}

#[derive(Debug, Default)]
pub struct LikeTracker {
    entries: DashMap<i64, Entry>,
    next_generation: AtomicU64,
}

impl LikeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, video_id: i64) -> LikeState {
        self.entries.get(&video_id).map(|e| e.state).unwrap_or_default()
    }

    /// Record what the server reported, unless a tap is outstanding.
    pub fn observe(&self, video_id: i64, liked: bool) {
        let mut entry = self.entries.entry(video_id).or_default();
        if !entry.in_flight() {
            entry.state = LikeState::from_liked(liked);
        }
    }

    /// Start a tap. Supersedes any tap still in flight for this video.
    pub fn begin(&self, video_id: i64) -> LikeTicket {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let mut entry = self.entries.entry(video_id).or_default();
        if !entry.in_flight() {
            entry.latest_failed = false;
            entry.superseded_success = false;
        }
        entry.latest = generation;
        entry.pending += 1;
        LikeTicket { video_id, generation }
    }

    /// Finish a tap.
    pub fn complete(&self, ticket: LikeTicket, succeeded: bool, target: LikeState) -> Settled {
        let mut entry = self.entries.entry(ticket.video_id).or_default();
        entry.pending = entry.pending.saturating_sub(1);

        if entry.latest == ticket.generation {
            entry.latest_failed = !succeeded;
            if succeeded {
                entry.state = target;
            }
        } else {
            tracing::debug!(video_id = ticket.video_id, "Ignoring response from superseded like tap");
            entry.superseded_success |= succeeded;
        }

        let needs_resync = !entry.in_flight() && entry.latest_failed && entry.superseded_success;
        if needs_resync {
            tracing::debug!(video_id = ticket.video_id, "Latest like tap failed after an earlier one succeeded");
        }
        Settled { state: entry.state, needs_resync }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
