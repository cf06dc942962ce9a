//! Thread creation, naming and priority, kept behind a small platform-neutral
//! surface so the realtime core never has to know which OS it's running on.

use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

/// Spawn a named thread running `body`.
///
/// The thread sets its own OS-level name as its first action, so the name
/// shows up in `top`/`ps`/debuggers even if `body` never yields control back
/// to us. Returns the OS error if the spawn itself fails (e.g. the process
/// is out of threads/memory) instead of panicking — callers that spawn
/// during a fallible construction step (the Producer, the device thread)
/// need to surface that as a normal error, not crash the process.
pub fn start<F>(name: &'static str, body: F) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    std::thread::Builder::new().name(name.to_string()).spawn(move || {
        set_name(name);
        body();
    })
}

#[cfg(unix)]
pub fn set_name(name: &str) {
    use std::ffi::CString;

    // pthread_setname_np caps names at 15 bytes + NUL on Linux; truncate
    // rather than fail, this is a diagnostic aid, not load-bearing.
    let truncated: String = name.chars().take(15).collect();
    let Ok(cstr) = CString::new(truncated) else { return };

    unsafe {
        libc::pthread_setname_np(libc::pthread_self(), cstr.as_ptr());
    }
}

#[cfg(not(unix))]
pub fn set_name(_name: &str) {}

/// Ask the OS scheduler for realtime priority on the calling thread.
///
/// Best-effort: most systems require elevated privileges (`CAP_SYS_NICE` on
/// Linux) to grant this, so failure is logged once and otherwise ignored —
/// the Producer still works, just without a priority boost.
#[cfg(target_os = "linux")]
pub fn set_realtime_priority() {
    let rc = unsafe {
        libc::sched_setscheduler(
            0,
            libc::SCHED_FIFO,
            &libc::sched_param { sched_priority: 32 },
        )
    };

    if rc < 0 {
        warn_once_permission_denied();
    }
}

#[cfg(not(target_os = "linux"))]
pub fn set_realtime_priority() {
    // No portable realtime-scheduling API on this platform; the host audio
    // API's own thread (for the callback) already runs at elevated
    // priority, so this only affects the Producer's scheduling class.
}

fn warn_once_permission_denied() {
    static WARNED: AtomicBool = AtomicBool::new(false);
    if WARNED.swap(true, Ordering::Relaxed) {
        return;
    }

    let err = std::io::Error::last_os_error();
    log::warn!("failed to set realtime thread priority: {err}");

    if err.kind() == ErrorKind::PermissionDenied {
        log::warn!("fix by running: setcap cap_sys_nice=ep <path to binary>");
    }
}
