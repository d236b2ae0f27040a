//! Read and control the operating system's "now playing" media session.
//!
//! The platform is reached through a small set of capability traits
//! ([`SessionProvider`], [`MediaSession`], [`MediaProperties`]) so the
//! boundary policy in [`ops`] can be exercised against fake sessions in
//! tests without any real platform present. The only real backend is the
//! Windows System Media Transport Controls (SMTC) one, which queries
//! whatever application currently owns media focus (Spotify, browsers,
//! etc.). Requires Windows 10 version 1803 or later.
//!
//! All handles are call-scoped: every operation re-acquires the current
//! session and drops it when the call returns. Nothing is cached, nothing
//! is subscribed to.

pub mod base64;
pub mod ops;
pub mod time;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "windows")]
pub use self::windows::SmtcProvider;

use anyhow::Result;
use thiserror::Error;

/// Failures surfaced by session backends. Both variants stop at the
/// operation layer; callers of [`ops`] only ever see absence values.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A platform async operation reached a terminal state other than
    /// "completed successfully".
    #[error("async operation failed: {0}")]
    AsyncOperationFailed(String),
    /// A snapshot or sub-property was missing even though a session exists.
    #[error("{0} unavailable")]
    PropertyUnavailable(&'static str),
}

/// Transport state reported by the platform session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    Closed,
    Opened,
    Changing,
    Stopped,
    Playing,
    Paused,
}

/// Point-in-time read of the playback timeline, in the platform's 100 ns
/// ticks. A snapshot, not a subscription: values are stale the moment the
/// call returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimelineSnapshot {
    pub position_ticks: i64,
    pub end_ticks: i64,
    /// When the platform last refreshed the timeline, as ticks since the
    /// platform epoch (1601-01-01 UTC).
    pub last_updated_ticks: i64,
}

/// Source of "the current media session".
///
/// Acquisition failures collapse to `None` here; this is the chokepoint
/// that keeps platform failures away from the boundary operations.
pub trait SessionProvider {
    type Session: MediaSession;

    /// Acquire a fresh handle to the session that currently owns media
    /// focus, or `None` when there is no such session or acquisition fails.
    fn current_session(&self) -> Option<Self::Session>;
}

/// One platform media session, borrowed for the duration of a single call.
pub trait MediaSession {
    type Properties: MediaProperties;

    /// Fetch the media-properties snapshot for the current track.
    fn try_get_properties(&self) -> Result<Self::Properties>;

    /// Read the playback timeline.
    fn timeline(&self) -> Result<TimelineSnapshot>;

    /// Read the current transport state.
    fn playback_status(&self) -> Result<PlaybackStatus>;

    /// AppUserModelId of the application that owns this session.
    fn source_app_id(&self) -> Result<String>;

    fn play(&self) -> Result<()>;
    fn pause(&self) -> Result<()>;
    fn skip_next(&self) -> Result<()>;
    fn skip_previous(&self) -> Result<()>;

    /// Request a new playback position, in 100 ns ticks.
    fn change_position(&self, ticks: i64) -> Result<()>;
}

/// Metadata snapshot of the current track. Any field may be empty; absence
/// is not an error.
pub trait MediaProperties {
    fn title(&self) -> Result<String>;
    fn artist(&self) -> Result<String>;
    fn album(&self) -> Result<String>;

    /// Artwork image bytes, fully materialized in memory, or `None` when
    /// the track has no thumbnail.
    fn artwork(&self) -> Result<Option<Vec<u8>>>;
}
