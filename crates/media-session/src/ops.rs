//! Boundary operations over a [`SessionProvider`].
//!
//! Every operation follows the same policy: acquire a fresh session, run
//! exactly one platform interaction, and degrade any failure to the
//! operation's absence value after a single log line. No failure of any
//! kind escapes this module; callers only ever see `Option`s, plain
//! values, or nothing.

use crate::{
    base64, time, MediaProperties, MediaSession, PlaybackStatus, SessionError, SessionProvider,
};
use anyhow::Result;
use tracing::{debug, warn};

/// The uniform entry-point wrapper. Absence of a session and any error
/// from the body both collapse to `None`.
fn with_session<P, T, F>(provider: &P, label: &str, op: F) -> Option<T>
where
    P: SessionProvider,
    F: FnOnce(&P::Session) -> Result<Option<T>>,
{
    let session = match provider.current_session() {
        Some(session) => session,
        None => {
            debug!("{label}: no active media session");
            return None;
        }
    };

    match op(&session) {
        Ok(value) => value,
        Err(e) => {
            warn!("{label}: {e:#}");
            None
        }
    }
}

pub fn track_title<P: SessionProvider>(provider: &P) -> Option<String> {
    with_session(provider, "track title", |session| {
        Ok(Some(session.try_get_properties()?.title()?))
    })
}

pub fn track_artist<P: SessionProvider>(provider: &P) -> Option<String> {
    with_session(provider, "track artist", |session| {
        Ok(Some(session.try_get_properties()?.artist()?))
    })
}

pub fn track_album<P: SessionProvider>(provider: &P) -> Option<String> {
    with_session(provider, "track album", |session| {
        Ok(Some(session.try_get_properties()?.album()?))
    })
}

/// Artwork of the current track as base64 text, or `None` when the track
/// has no thumbnail.
pub fn track_cover_base64<P: SessionProvider>(provider: &P) -> Option<String> {
    with_session(provider, "track cover", |session| {
        let properties = session.try_get_properties()?;
        match properties.artwork()? {
            Some(bytes) => Ok(Some(base64::encode(&bytes))),
            None => {
                debug!("track cover: {}", SessionError::PropertyUnavailable("thumbnail"));
                Ok(None)
            }
        }
    })
}

/// AppUserModelId of the application that owns the current session.
pub fn track_source<P: SessionProvider>(provider: &P) -> Option<String> {
    with_session(provider, "track source", |session| {
        Ok(Some(session.source_app_id()?))
    })
}

/// Playback position in whole seconds.
pub fn track_progress_seconds<P: SessionProvider>(provider: &P) -> Option<i64> {
    with_session(provider, "track progress", |session| {
        Ok(Some(time::ticks_to_seconds(session.timeline()?.position_ticks)))
    })
}

/// Track length in whole seconds.
pub fn track_duration_seconds<P: SessionProvider>(provider: &P) -> Option<i64> {
    with_session(provider, "track duration", |session| {
        Ok(Some(time::ticks_to_seconds(session.timeline()?.end_ticks)))
    })
}

/// Position the platform last reported, in whole seconds. Same timeline
/// read as [`track_progress_seconds`], kept as its own operation so the
/// two boundary calls stay independently labeled in logs.
pub fn last_known_position_seconds<P: SessionProvider>(provider: &P) -> Option<i64> {
    with_session(provider, "last known position", |session| {
        Ok(Some(time::ticks_to_seconds(session.timeline()?.position_ticks)))
    })
}

/// When the platform last refreshed the timeline, as Unix epoch
/// milliseconds.
pub fn last_updated_unix_ms<P: SessionProvider>(provider: &P) -> Option<i64> {
    with_session(provider, "last updated time", |session| {
        Ok(Some(time::universal_time_to_unix_ms(
            session.timeline()?.last_updated_ticks,
        )))
    })
}

/// True only when the session reports exactly `Playing`.
pub fn is_playing<P: SessionProvider>(provider: &P) -> bool {
    with_session(provider, "playback status", |session| {
        Ok(Some(session.playback_status()? == PlaybackStatus::Playing))
    })
    .unwrap_or(false)
}

/// Resume or pause playback. Silent no-op without a session.
pub fn set_playing<P: SessionProvider>(provider: &P, play: bool) {
    let label = if play { "play" } else { "pause" };
    let _ = with_session(provider, label, |session| {
        if play {
            session.play()?;
        } else {
            session.pause()?;
        }
        Ok(Some(()))
    });
}

/// Seek to a whole-second position. Silent no-op without a session.
pub fn seek_to<P: SessionProvider>(provider: &P, seconds: i64) {
    let _ = with_session(provider, "seek", |session| {
        session.change_position(time::seconds_to_ticks(seconds))?;
        Ok(Some(()))
    });
}

/// Skip to the next track. Silent no-op without a session.
pub fn next_track<P: SessionProvider>(provider: &P) {
    let _ = with_session(provider, "next track", |session| {
        session.skip_next()?;
        Ok(Some(()))
    });
}

/// Skip to the previous track. Silent no-op without a session.
pub fn previous_track<P: SessionProvider>(provider: &P) {
    let _ = with_session(provider, "previous track", |session| {
        session.skip_previous()?;
        Ok(Some(()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimelineSnapshot;
    use anyhow::bail;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Command {
        Play,
        Pause,
        SkipNext,
        SkipPrevious,
        ChangePosition(i64),
    }

    #[derive(Clone)]
    struct FakeSession {
        title: String,
        artist: String,
        album: String,
        artwork: Option<Vec<u8>>,
        timeline: TimelineSnapshot,
        status: PlaybackStatus,
        source: String,
        properties_fail: bool,
        timeline_fail: bool,
        commands: Arc<Mutex<Vec<Command>>>,
    }

    impl FakeSession {
        fn new() -> Self {
            Self {
                title: "Time".into(),
                artist: "Pink Floyd".into(),
                album: "The Dark Side of the Moon".into(),
                artwork: None,
                timeline: TimelineSnapshot::default(),
                status: PlaybackStatus::Paused,
                source: "Spotify.exe".into(),
                properties_fail: false,
                timeline_fail: false,
                commands: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn push(&self, command: Command) {
            self.commands.lock().unwrap().push(command);
        }
    }

    struct FakeProperties {
        title: String,
        artist: String,
        album: String,
        artwork: Option<Vec<u8>>,
    }

    impl MediaProperties for FakeProperties {
        fn title(&self) -> Result<String> {
            Ok(self.title.clone())
        }

        fn artist(&self) -> Result<String> {
            Ok(self.artist.clone())
        }

        fn album(&self) -> Result<String> {
            Ok(self.album.clone())
        }

        fn artwork(&self) -> Result<Option<Vec<u8>>> {
            Ok(self.artwork.clone())
        }
    }

    impl MediaSession for FakeSession {
        type Properties = FakeProperties;

        fn try_get_properties(&self) -> Result<FakeProperties> {
            if self.properties_fail {
                bail!("media properties unavailable");
            }
            Ok(FakeProperties {
                title: self.title.clone(),
                artist: self.artist.clone(),
                album: self.album.clone(),
                artwork: self.artwork.clone(),
            })
        }

        fn timeline(&self) -> Result<TimelineSnapshot> {
            if self.timeline_fail {
                bail!("timeline unavailable");
            }
            Ok(self.timeline)
        }

        fn playback_status(&self) -> Result<PlaybackStatus> {
            Ok(self.status)
        }

        fn source_app_id(&self) -> Result<String> {
            Ok(self.source.clone())
        }

        fn play(&self) -> Result<()> {
            self.push(Command::Play);
            Ok(())
        }

        fn pause(&self) -> Result<()> {
            self.push(Command::Pause);
            Ok(())
        }

        fn skip_next(&self) -> Result<()> {
            self.push(Command::SkipNext);
            Ok(())
        }

        fn skip_previous(&self) -> Result<()> {
            self.push(Command::SkipPrevious);
            Ok(())
        }

        fn change_position(&self, ticks: i64) -> Result<()> {
            self.push(Command::ChangePosition(ticks));
            Ok(())
        }
    }

    struct FakeProvider {
        session: Option<FakeSession>,
    }

    impl SessionProvider for FakeProvider {
        type Session = FakeSession;

        fn current_session(&self) -> Option<FakeSession> {
            self.session.clone()
        }
    }

    fn provider_with(session: FakeSession) -> FakeProvider {
        FakeProvider {
            session: Some(session),
        }
    }

    #[test]
    fn test_no_session_yields_absence_everywhere() {
        let provider = FakeProvider { session: None };

        assert_eq!(track_title(&provider), None);
        assert_eq!(track_artist(&provider), None);
        assert_eq!(track_album(&provider), None);
        assert_eq!(track_cover_base64(&provider), None);
        assert_eq!(track_source(&provider), None);
        assert_eq!(track_progress_seconds(&provider), None);
        assert_eq!(track_duration_seconds(&provider), None);
        assert_eq!(last_known_position_seconds(&provider), None);
        assert_eq!(last_updated_unix_ms(&provider), None);
        assert!(!is_playing(&provider));
    }

    #[test]
    fn test_no_session_makes_commands_silent_noops() {
        let provider = FakeProvider { session: None };

        set_playing(&provider, true);
        set_playing(&provider, false);
        seek_to(&provider, 42);
        next_track(&provider);
        previous_track(&provider);
        // Nothing to assert beyond "did not panic": with no session there
        // is no command sink to inspect.
    }

    #[test]
    fn test_metadata_fields_come_from_properties_snapshot() {
        let provider = provider_with(FakeSession::new());

        assert_eq!(track_title(&provider).as_deref(), Some("Time"));
        assert_eq!(track_artist(&provider).as_deref(), Some("Pink Floyd"));
        assert_eq!(
            track_album(&provider).as_deref(),
            Some("The Dark Side of the Moon")
        );
        assert_eq!(track_source(&provider).as_deref(), Some("Spotify.exe"));
    }

    #[test]
    fn test_cover_is_base64_of_artwork_bytes() {
        let mut session = FakeSession::new();
        session.artwork = Some(b"foobar".to_vec());
        let provider = provider_with(session);

        assert_eq!(track_cover_base64(&provider).as_deref(), Some("Zm9vYmFy"));
    }

    #[test]
    fn test_missing_thumbnail_is_absence_not_error() {
        let provider = provider_with(FakeSession::new());
        assert_eq!(track_cover_base64(&provider), None);
    }

    #[test]
    fn test_properties_failure_degrades_to_absence() {
        let mut session = FakeSession::new();
        session.properties_fail = true;
        let provider = provider_with(session);

        assert_eq!(track_title(&provider), None);
        assert_eq!(track_cover_base64(&provider), None);
    }

    #[test]
    fn test_timeline_failure_degrades_to_absence() {
        let mut session = FakeSession::new();
        session.timeline_fail = true;
        let provider = provider_with(session);

        assert_eq!(track_progress_seconds(&provider), None);
        assert_eq!(track_duration_seconds(&provider), None);
        assert_eq!(last_updated_unix_ms(&provider), None);
    }

    #[test]
    fn test_timeline_reads_truncate_to_whole_seconds() {
        let mut session = FakeSession::new();
        session.timeline = TimelineSnapshot {
            position_ticks: 25_000_000,
            end_ticks: 1_234_567_890,
            last_updated_ticks: time::UNIX_EPOCH_OFFSET_TICKS + 15_000_000,
        };
        let provider = provider_with(session);

        assert_eq!(track_progress_seconds(&provider), Some(2));
        assert_eq!(last_known_position_seconds(&provider), Some(2));
        assert_eq!(track_duration_seconds(&provider), Some(123));
        assert_eq!(last_updated_unix_ms(&provider), Some(1500));
    }

    #[test]
    fn test_is_playing_requires_exactly_playing() {
        for (status, expected) in [
            (PlaybackStatus::Playing, true),
            (PlaybackStatus::Paused, false),
            (PlaybackStatus::Stopped, false),
            (PlaybackStatus::Changing, false),
            (PlaybackStatus::Opened, false),
            (PlaybackStatus::Closed, false),
        ] {
            let mut session = FakeSession::new();
            session.status = status;
            let provider = provider_with(session);
            assert_eq!(is_playing(&provider), expected, "status {status:?}");
        }
    }

    #[test]
    fn test_commands_reach_the_session() {
        let session = FakeSession::new();
        let commands = session.commands.clone();
        let provider = provider_with(session);

        set_playing(&provider, true);
        set_playing(&provider, false);
        seek_to(&provider, 90);
        next_track(&provider);
        previous_track(&provider);

        assert_eq!(
            *commands.lock().unwrap(),
            vec![
                Command::Play,
                Command::Pause,
                Command::ChangePosition(900_000_000),
                Command::SkipNext,
                Command::SkipPrevious,
            ]
        );
    }

    #[test]
    fn test_concurrent_calls_do_not_interfere() {
        let mut playing = FakeSession::new();
        playing.status = PlaybackStatus::Playing;
        playing.timeline.position_ticks = 50_000_000;
        let provider = provider_with(playing);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        assert_eq!(track_title(&provider).as_deref(), Some("Time"));
                        assert!(is_playing(&provider));
                        assert_eq!(track_progress_seconds(&provider), Some(5));
                    }
                });
            }
        });
    }
}
