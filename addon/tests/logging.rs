use kaddon::prelude::*;
use kaddon_host::prelude::{AddonLog, Host, LoadedAddon};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Default)]
struct RecordingHost {
    records: Arc<Mutex<Vec<(AddonLog, String)>>>,
}

impl Host for RecordingHost {
    fn log(&self, level: AddonLog, message: &str) {
        self.records.lock().push((level, message.to_owned()));
    }
}

struct Chatty;

impl Addon for Chatty {
    fn new(_host: HostHandle) -> Result<Self, AddonError> {
        Ok(Self)
    }

    fn create(&mut self) -> AddonStatus {
        log::error!("error message");
        log::warn!("warning message");
        log::info!("info message");
        log::debug!("debug message");
        log::trace!("trace message");
        AddonStatus::Ok
    }
}

// Single test: the logger is process-wide.
#[test]
fn records_are_forwarded_to_the_host_while_created() {
    static ENTRY: AddonEntryDescriptor = kaddon_entry!(Chatty);

    let host = RecordingHost::default();
    let records = host.records.clone();

    // SAFETY: the descriptor was built by kaddon_entry
    let mut addon = unsafe { LoadedAddon::from_descriptor(&ENTRY, host, "/opt/addons") }.unwrap();
    assert_eq!(addon.create("1.0.14").unwrap(), AddonStatus::Ok);

    let messages: Vec<_> = records
        .lock()
        .iter()
        .filter(|(_, message)| message.ends_with(" message"))
        .cloned()
        .collect();

    assert_eq!(
        messages,
        [
            (AddonLog::Error, "error message".to_owned()),
            (AddonLog::Warning, "warning message".to_owned()),
            (AddonLog::Info, "info message".to_owned()),
            (AddonLog::Debug, "debug message".to_owned()),
        ]
    );

    addon.destroy();
    let count = records.lock().len();

    log::info!("after destroy");
    assert_eq!(records.lock().len(), count);
}
