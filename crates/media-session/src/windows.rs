//! Windows media session access via System Media Transport Controls (SMTC)
//!
//! This module adapts the callback-based WinRT API into the synchronous
//! capability traits of this crate. Every WinRT async operation is driven
//! by [`wait_for`], which parks the calling thread on a one-shot channel
//! until the platform signals completion.

use crate::{
    MediaProperties, MediaSession, PlaybackStatus, SessionError, SessionProvider,
    TimelineSnapshot,
};
use anyhow::{Context, Result};
use std::sync::mpsc;
use tracing::{debug, warn};
use windows::core::{Interface, RuntimeType};
use windows::Foundation::{AsyncOperationCompletedHandler, AsyncStatus, IAsyncOperation};
use windows::Media::Control::{
    GlobalSystemMediaTransportControlsSession, GlobalSystemMediaTransportControlsSessionManager,
    GlobalSystemMediaTransportControlsSessionMediaProperties,
    GlobalSystemMediaTransportControlsSessionPlaybackStatus,
};
use windows::Storage::Streams::DataReader;

/// Block the calling thread until `operation` reaches a terminal state,
/// then return its result.
///
/// Completion is delivered through a one-shot `Completed` handler feeding
/// an mpsc channel; the handler fires immediately if the operation already
/// finished, so the notification cannot be missed. There is deliberately
/// no timeout: an operation the platform never terminates blocks the
/// caller indefinitely. Boundary callers accept that limitation.
fn wait_for<T>(operation: IAsyncOperation<T>, context: &str) -> Result<T>
where
    T: RuntimeType + 'static,
{
    let (tx, rx) = mpsc::channel();
    operation
        .SetCompleted(&AsyncOperationCompletedHandler::new(move |_, status| {
            let _ = tx.send(status);
            Ok(())
        }))
        .with_context(|| format!("{context}: registering completion handler"))?;

    // A dropped sender without a send means the platform abandoned the
    // operation; treat it like any other non-success terminal state.
    let status = rx.recv().unwrap_or(AsyncStatus::Error);
    if status == AsyncStatus::Completed {
        operation
            .GetResults()
            .with_context(|| format!("{context}: retrieving results"))
    } else {
        let err = SessionError::AsyncOperationFailed(format!("terminal status {status:?}"));
        warn!("{context}: {err}");
        Err(err.into())
    }
}

/// Stateless provider over the SMTC session manager.
///
/// Each acquisition requests the manager and the current session afresh,
/// so no platform handle ever outlives a single boundary call.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmtcProvider;

impl SmtcProvider {
    fn request_session() -> Result<Option<SmtcSession>> {
        let operation = GlobalSystemMediaTransportControlsSessionManager::RequestAsync()
            .context("requesting SMTC session manager")?;
        let manager = wait_for(operation, "session manager request")?;

        match manager.GetCurrentSession() {
            Ok(session) => Ok(Some(SmtcSession { inner: session })),
            Err(e) => {
                debug!("no active media session: {e}");
                Ok(None)
            }
        }
    }
}

impl SessionProvider for SmtcProvider {
    type Session = SmtcSession;

    fn current_session(&self) -> Option<SmtcSession> {
        match Self::request_session() {
            Ok(session) => session,
            Err(e) => {
                warn!("failed to acquire media session: {e:#}");
                None
            }
        }
    }
}

/// A borrowed handle to the session currently owning media focus.
pub struct SmtcSession {
    inner: GlobalSystemMediaTransportControlsSession,
}

impl MediaSession for SmtcSession {
    type Properties = SmtcProperties;

    fn try_get_properties(&self) -> Result<SmtcProperties> {
        let operation = self
            .inner
            .TryGetMediaPropertiesAsync()
            .context("starting media properties request")?;
        let inner = wait_for(operation, "media properties request")?;
        Ok(SmtcProperties { inner })
    }

    fn timeline(&self) -> Result<TimelineSnapshot> {
        let timeline = self
            .inner
            .GetTimelineProperties()
            .context("reading timeline properties")?;
        Ok(TimelineSnapshot {
            position_ticks: timeline.Position()?.Duration,
            end_ticks: timeline.EndTime()?.Duration,
            last_updated_ticks: timeline.LastUpdatedTime()?.UniversalTime,
        })
    }

    fn playback_status(&self) -> Result<PlaybackStatus> {
        let status = self
            .inner
            .GetPlaybackInfo()
            .context("reading playback info")?
            .PlaybackStatus()?;
        Ok(map_status(status))
    }

    fn source_app_id(&self) -> Result<String> {
        Ok(self.inner.SourceAppUserModelId()?.to_string())
    }

    fn play(&self) -> Result<()> {
        let operation = self.inner.TryPlayAsync().context("starting play command")?;
        wait_for(operation, "play command")?;
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        let operation = self
            .inner
            .TryPauseAsync()
            .context("starting pause command")?;
        wait_for(operation, "pause command")?;
        Ok(())
    }

    fn skip_next(&self) -> Result<()> {
        let operation = self
            .inner
            .TrySkipNextAsync()
            .context("starting skip-next command")?;
        wait_for(operation, "skip-next command")?;
        Ok(())
    }

    fn skip_previous(&self) -> Result<()> {
        let operation = self
            .inner
            .TrySkipPreviousAsync()
            .context("starting skip-previous command")?;
        wait_for(operation, "skip-previous command")?;
        Ok(())
    }

    fn change_position(&self, ticks: i64) -> Result<()> {
        let operation = self
            .inner
            .TryChangePlaybackPositionAsync(ticks)
            .context("starting change-position command")?;
        wait_for(operation, "change-position command")?;
        Ok(())
    }
}

/// Media-properties snapshot of the current track.
pub struct SmtcProperties {
    inner: GlobalSystemMediaTransportControlsSessionMediaProperties,
}

impl MediaProperties for SmtcProperties {
    fn title(&self) -> Result<String> {
        Ok(self.inner.Title()?.to_string())
    }

    fn artist(&self) -> Result<String> {
        Ok(self.inner.Artist()?.to_string())
    }

    fn album(&self) -> Result<String> {
        Ok(self.inner.AlbumTitle()?.to_string())
    }

    fn artwork(&self) -> Result<Option<Vec<u8>>> {
        // A track without artwork has no thumbnail reference at all.
        let thumbnail = match self.inner.Thumbnail() {
            Ok(reference) => reference,
            Err(_) => return Ok(None),
        };

        let operation = thumbnail
            .OpenReadAsync()
            .context("opening thumbnail stream")?;
        let stream = wait_for(operation, "thumbnail open")?;
        let size = stream.Size().context("reading thumbnail stream size")?;

        let reader = DataReader::CreateDataReader(
            &stream
                .GetInputStreamAt(0)
                .context("positioning thumbnail stream")?,
        )
        .context("creating thumbnail reader")?;
        let load = reader
            .LoadAsync(size as u32)
            .context("starting thumbnail load")?
            .cast::<IAsyncOperation<u32>>()
            .context("thumbnail load operation interface")?;
        wait_for(load, "thumbnail load")?;

        let mut bytes = vec![0u8; size as usize];
        reader
            .ReadBytes(&mut bytes)
            .context("reading thumbnail bytes")?;
        Ok(Some(bytes))
    }
}

fn map_status(
    status: GlobalSystemMediaTransportControlsSessionPlaybackStatus,
) -> PlaybackStatus {
    match status {
        GlobalSystemMediaTransportControlsSessionPlaybackStatus::Opened => PlaybackStatus::Opened,
        GlobalSystemMediaTransportControlsSessionPlaybackStatus::Changing => {
            PlaybackStatus::Changing
        }
        GlobalSystemMediaTransportControlsSessionPlaybackStatus::Stopped => PlaybackStatus::Stopped,
        GlobalSystemMediaTransportControlsSessionPlaybackStatus::Playing => PlaybackStatus::Playing,
        GlobalSystemMediaTransportControlsSessionPlaybackStatus::Paused => PlaybackStatus::Paused,
        _ => PlaybackStatus::Closed,
    }
}
