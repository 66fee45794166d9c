//! Session analytics hooks
//!
//! Fire-and-forget. The default sink writes to the log; hosts can plug in
//! their own by implementing [`Telemetry`].

use serde::Serialize;

use crate::settings::Setting;

/// Figures reported when a session ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSummary {
    pub score: u32,
    /// Play time actually spent (ms)
    pub duration_ms: f32,
    pub max_combo: u32,
}

/// Receives gameplay and preference events
pub trait Telemetry {
    fn setting_changed(&mut self, setting: Setting, value: bool);
    fn session_started(&mut self);
    fn session_ended(&mut self, summary: SessionSummary);
}

/// Writes every event through `log`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn setting_changed(&mut self, setting: Setting, value: bool) {
        log::info!("setting changed: {}={}", setting.as_str(), value);
    }

    fn session_started(&mut self) {
        log::info!("session started");
    }

    fn session_ended(&mut self, summary: SessionSummary) {
        log::info!(
            "session ended: score={} duration={:.0}ms max_combo={}",
            summary.score,
            summary.duration_ms,
            summary.max_combo
        );
    }
}

/// Recorded telemetry call, for inspection in tests and the demo runner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TelemetryRecord {
    SettingChanged { setting: Setting, value: bool },
    SessionStarted,
    SessionEnded(SessionSummary),
}

/// Keeps every call in memory and forwards it to the log
#[derive(Debug, Default, Clone)]
pub struct RecordingTelemetry {
    records: std::rc::Rc<std::cell::RefCell<Vec<TelemetryRecord>>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls seen so far; clones share the same log
    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records.borrow().clone()
    }

    fn push(&self, record: TelemetryRecord) {
        self.records.borrow_mut().push(record);
    }
}

impl Telemetry for RecordingTelemetry {
    fn setting_changed(&mut self, setting: Setting, value: bool) {
        LogTelemetry.setting_changed(setting, value);
        self.push(TelemetryRecord::SettingChanged { setting, value });
    }

    fn session_started(&mut self) {
        LogTelemetry.session_started();
        self.push(TelemetryRecord::SessionStarted);
    }

    fn session_ended(&mut self, summary: SessionSummary) {
        LogTelemetry.session_ended(summary);
        self.push(TelemetryRecord::SessionEnded(summary));
    }
}
