//! JNI boundary for the NowBridge media-session library.
//!
//! Native half of `io.nowbridge.media.MediaController`. Each export
//! re-acquires the current media session, performs one query or command,
//! and marshals the result to the JVM. Failures never cross the boundary:
//! queries degrade to null / -1 / false and commands to silent no-ops,
//! with a log line as the only trace. Panics are caught at every export
//! and degrade the same way.
//!
//! The bridge blocks the calling JVM thread while the platform completes
//! each operation; there is no timeout.

#![cfg(target_os = "windows")]

use jni::objects::JObject;
use jni::sys::{jboolean, jint, jlong, jstring, JavaVM, JNI_FALSE, JNI_TRUE, JNI_VERSION_1_6};
use jni::JNIEnv;
use nowbridge_media_session::{ops, SmtcProvider};
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use windows::Win32::System::WinRT::{RoInitialize, RO_INIT_MULTITHREADED};

static INIT: Once = Once::new();

/// Called by the JVM once when the library is loaded. Initializes logging
/// and the process-wide WinRT apartment; the JVM owns process teardown, so
/// there is no matching unload hook.
#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: *mut JavaVM, _reserved: *mut c_void) -> jint {
    guarded("JNI_OnLoad", -1, || {
        let mut version = JNI_VERSION_1_6;
        INIT.call_once(|| {
            let _ = tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "info,nowbridge_media_session=debug".into()),
                )
                .with(tracing_subscriber::fmt::layer())
                .try_init();

            // SAFETY: one-time process-wide apartment initialization on the
            // JVM's library-load thread.
            if let Err(e) = unsafe { RoInitialize(RO_INIT_MULTITHREADED) } {
                warn!("WinRT initialization failed: {e}");
                version = -1;
            } else {
                debug!("JNI bridge initialized");
            }
        });
        version
    })
}

/// Run an export body, degrading a panic to the operation's sentinel so
/// nothing unwinds into the JVM.
fn guarded<T>(label: &str, sentinel: T, body: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => value,
        Err(_) => {
            warn!("{label}: panicked, returning sentinel");
            sentinel
        }
    }
}

/// Marshal an optional text result; absence becomes a null `jstring`.
fn text_result(env: &mut JNIEnv, label: &str, value: Option<String>) -> jstring {
    match value {
        Some(text) => match env.new_string(text) {
            Ok(s) => s.into_raw(),
            Err(e) => {
                warn!("{label}: constructing Java string: {e}");
                std::ptr::null_mut()
            }
        },
        None => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_getCurrentTrackTitle(
    mut env: JNIEnv,
    _this: JObject,
) -> jstring {
    guarded("getCurrentTrackTitle", std::ptr::null_mut(), || {
        text_result(&mut env, "getCurrentTrackTitle", ops::track_title(&SmtcProvider))
    })
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_getCurrentTrackAlbum(
    mut env: JNIEnv,
    _this: JObject,
) -> jstring {
    guarded("getCurrentTrackAlbum", std::ptr::null_mut(), || {
        text_result(&mut env, "getCurrentTrackAlbum", ops::track_album(&SmtcProvider))
    })
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_getCurrentTrackArtist(
    mut env: JNIEnv,
    _this: JObject,
) -> jstring {
    guarded("getCurrentTrackArtist", std::ptr::null_mut(), || {
        text_result(&mut env, "getCurrentTrackArtist", ops::track_artist(&SmtcProvider))
    })
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_getCurrentTrackCoverBase64(
    mut env: JNIEnv,
    _this: JObject,
) -> jstring {
    guarded("getCurrentTrackCoverBase64", std::ptr::null_mut(), || {
        text_result(
            &mut env,
            "getCurrentTrackCoverBase64",
            ops::track_cover_base64(&SmtcProvider),
        )
    })
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_getCurrentTrackSource(
    mut env: JNIEnv,
    _this: JObject,
) -> jstring {
    guarded("getCurrentTrackSource", std::ptr::null_mut(), || {
        text_result(&mut env, "getCurrentTrackSource", ops::track_source(&SmtcProvider))
    })
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_getCurrentTrackProgress(
    _env: JNIEnv,
    _this: JObject,
) -> jint {
    guarded("getCurrentTrackProgress", -1, || {
        ops::track_progress_seconds(&SmtcProvider)
            .map(|seconds| seconds as jint)
            .unwrap_or(-1)
    })
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_getCurrentTrackDuration(
    _env: JNIEnv,
    _this: JObject,
) -> jint {
    guarded("getCurrentTrackDuration", -1, || {
        ops::track_duration_seconds(&SmtcProvider)
            .map(|seconds| seconds as jint)
            .unwrap_or(-1)
    })
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_getLastKnownPosition(
    _env: JNIEnv,
    _this: JObject,
) -> jint {
    guarded("getLastKnownPosition", -1, || {
        ops::last_known_position_seconds(&SmtcProvider)
            .map(|seconds| seconds as jint)
            .unwrap_or(-1)
    })
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_getLastUpdatedTime(
    _env: JNIEnv,
    _this: JObject,
) -> jlong {
    guarded("getLastUpdatedTime", -1, || {
        ops::last_updated_unix_ms(&SmtcProvider).unwrap_or(-1)
    })
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_isPlaying(
    _env: JNIEnv,
    _this: JObject,
) -> jboolean {
    guarded("isPlaying", JNI_FALSE, || {
        if ops::is_playing(&SmtcProvider) {
            JNI_TRUE
        } else {
            JNI_FALSE
        }
    })
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_setPlaying(
    _env: JNIEnv,
    _this: JObject,
    play: jboolean,
) {
    guarded("setPlaying", (), || {
        ops::set_playing(&SmtcProvider, play != JNI_FALSE);
    });
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_seekTo(
    _env: JNIEnv,
    _this: JObject,
    seconds: jint,
) {
    guarded("seekTo", (), || {
        ops::seek_to(&SmtcProvider, i64::from(seconds));
    });
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_nextTrack(
    _env: JNIEnv,
    _this: JObject,
) {
    guarded("nextTrack", (), || ops::next_track(&SmtcProvider));
}

#[no_mangle]
pub extern "system" fn Java_io_nowbridge_media_MediaController_previousTrack(
    _env: JNIEnv,
    _this: JObject,
) {
    guarded("previousTrack", (), || ops::previous_track(&SmtcProvider));
}
