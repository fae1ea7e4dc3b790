//! Forwarding of the [`log`] crate's records to the host's log.
//!
//! Addons log through the usual `log` macros. Once an addon is created, its records are sent to
//! the host; before that (or if the host has no logging function), they go to the standard error
//! output instead.
//!
//! The `log` facade only has a single global logger, so there is a single forwarding target per
//! process. When several addons are created in the same process (for instance multiple
//! [`kaddon_entry!`](crate::kaddon_entry) descriptors driven by one host), records go to the host
//! of the most recently created one. Destroying an addon only stops forwarding if it is still the
//! current target.

use crate::host::HostHandle;
use kaddon_common::log::AddonLog;
use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

static SINK: RwLock<Option<HostHandle>> = parking_lot::const_rwlock(None);
static LOGGER: HostLogger = HostLogger;
static INSTALLED: OnceCell<bool> = OnceCell::new();

/// The [`Log`] implementation forwarding records to the host.
pub struct HostLogger;

impl HostLogger {
    /// Installs the host logger as the global logger, if no other logger was installed first.
    ///
    /// This only has an effect the first time it is called. Returns whether the host logger is the
    /// active global logger.
    pub fn install() -> bool {
        *INSTALLED.get_or_init(|| match log::set_logger(&LOGGER) {
            Ok(()) => {
                log::set_max_level(LevelFilter::Debug);
                true
            }
            Err(_) => false,
        })
    }
}

/// Maps a `log` level to the host's levels. The host has no trace level.
pub fn host_level(level: Level) -> AddonLog {
    match level {
        Level::Error => AddonLog::Error,
        Level::Warn => AddonLog::Warning,
        Level::Info => AddonLog::Info,
        Level::Debug | Level::Trace => AddonLog::Debug,
    }
}

/// Starts forwarding records to the given host.
///
/// Forwarding stops again when the returned binding is dropped, unless it is kept.
pub(crate) fn bind(host: HostHandle) -> SinkBinding {
    *SINK.write() = Some(host);
    SinkBinding { host }
}

#[must_use]
pub(crate) struct SinkBinding {
    host: HostHandle,
}

impl SinkBinding {
    /// Keeps forwarding until [`unbind`] is called for this host.
    #[inline]
    pub fn keep(self) {
        core::mem::forget(self)
    }
}

impl Drop for SinkBinding {
    fn drop(&mut self) {
        unbind(self.host);
    }
}

#[cfg(test)]
pub(crate) fn is_bound_to(host: HostHandle) -> bool {
    SINK.read().is_some_and(|bound| bound.as_raw() == host.as_raw())
}

/// Serializes the tests touching the process-wide sink.
#[cfg(test)]
pub(crate) static SINK_TEST_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

/// Stops forwarding to the given host, unless another one was bound since.
pub(crate) fn unbind(host: HostHandle) {
    let mut sink = SINK.write();
    if sink.is_some_and(|bound| bound.as_raw() == host.as_raw()) {
        *sink = None;
    }
}

/// Sends a message at the given host level, bypassing the `log` facade.
pub(crate) fn log_to_host(level: AddonLog, message: &str) {
    let sent = match *SINK.read() {
        Some(host) => host.log(level, message),
        None => false,
    };

    if !sent {
        eprintln!("[ADDON] [{}] {message}", level.label());
    }
}

impl Log for HostLogger {
    #[inline]
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        log_to_host(host_level(record.level()), &record.args().to_string());
    }

    #[inline]
    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaddon_common::sys::AddonGlobalInterface;

    fn interface() -> Box<AddonGlobalInterface> {
        Box::new(AddonGlobalInterface {
            lib_base_path: core::ptr::null(),
            addon_base: core::ptr::null_mut(),
            global_single_instance: core::ptr::null_mut(),
            first_kodi_instance: core::ptr::null_mut(),
            to_kodi: core::ptr::null_mut(),
            to_addon: core::ptr::null_mut(),
        })
    }

    #[test]
    fn dropped_bindings_only_unbind_their_own_host() {
        let _lock = SINK_TEST_LOCK.lock();

        let mut first = interface();
        let mut second = interface();
        // SAFETY: both interfaces outlive the handles
        let first = unsafe { HostHandle::from_raw(&mut *first) }.unwrap();
        // SAFETY: see above
        let second = unsafe { HostHandle::from_raw(&mut *second) }.unwrap();

        let first_binding = bind(first);
        let second_binding = bind(second);
        assert!(is_bound_to(second));

        drop(first_binding);
        assert!(is_bound_to(second));

        drop(second_binding);
        assert!(!is_bound_to(second));
        assert!(!is_bound_to(first));
    }

    #[test]
    fn kept_bindings_last_until_unbound() {
        let _lock = SINK_TEST_LOCK.lock();

        let mut interface = interface();
        // SAFETY: the interface outlives the handle
        let host = unsafe { HostHandle::from_raw(&mut *interface) }.unwrap();

        bind(host).keep();
        assert!(is_bound_to(host));

        unbind(host);
        assert!(!is_bound_to(host));
    }

    #[test]
    fn levels_map_to_host_levels() {
        assert_eq!(host_level(Level::Error), AddonLog::Error);
        assert_eq!(host_level(Level::Warn), AddonLog::Warning);
        assert_eq!(host_level(Level::Info), AddonLog::Info);
        assert_eq!(host_level(Level::Debug), AddonLog::Debug);
        assert_eq!(host_level(Level::Trace), AddonLog::Debug);
    }
}
