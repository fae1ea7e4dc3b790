use crate::dispatch::DispatchDefect;
use crate::logging::log_to_host;
use kaddon_common::log::AddonLog;
use std::any::Any;
use std::panic::AssertUnwindSafe;

/// Runs `f`, making sure no panic unwinds into the host.
///
/// A [`DispatchDefect`] is reported to the host as fatal, then aborts the process. Any other panic
/// is logged, and `on_panic` is returned instead.
pub(crate) fn guard<R>(operation: &'static str, on_panic: R, f: impl FnOnce() -> R) -> R {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            if let Some(defect) = payload.downcast_ref::<DispatchDefect>() {
                log_to_host(
                    AddonLog::Fatal,
                    &format!("Fatal addon defect during {operation}: {defect}"),
                );
                std::process::abort();
            }

            log::error!(
                "Addon panicked during {operation}: {}",
                panic_message(payload.as_ref())
            );
            on_panic
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

/// Reads a possibly null C string coming from the host. Invalid UTF-8 is replaced.
///
/// # Safety
/// The pointer must be null or point to a valid NUL-terminated string.
pub(crate) unsafe fn str_from_host(ptr: *const std::ffi::c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }

    std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned()
}
