use fire_vision::alert::{AlertEvent, AlertSink, AudioPlayer};
use fire_vision::pipeline::AlarmState;
use std::io::Write;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Writes alarm output to the log.
#[derive(Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn publish(&mut self, event: &AlertEvent) {
        if !event.state_changed() {
            debug!(
                frame = ?event.frame_index,
                state = %event.state,
                confidence = event.confidence,
                "Frame"
            );
            return;
        }

        match event.state {
            AlarmState::Alarm => warn!(
                confidence = %format!("{:.0}%", event.confidence * 100.0),
                level = ?event.confidence_level(),
                regions = event.regions.len(),
                "FIRE DETECTED"
            ),
            state => info!(
                frame = ?event.frame_index,
                from = %event.previous_state,
                to = %state,
                "Status"
            ),
        }
    }

    fn set_audio_enabled(&mut self, enabled: bool) {
        info!("Sound {}", if enabled { "enabled" } else { "disabled" });
    }
}

/// Rings the terminal bell once a second while looping.
pub struct TerminalBell {
    period: Duration,
    ringer: Option<JoinHandle<()>>,
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            ringer: None,
        }
    }
}

impl AudioPlayer for TerminalBell {
    fn start_loop(&mut self) {
        if self.ringer.is_some() {
            return;
        }
        let period = self.period;
        self.ringer = Some(tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            loop {
                ticks.tick().await;
                let mut stderr = std::io::stderr();
                let _ = stderr.write_all(b"\x07");
                let _ = stderr.flush();
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(ringer) = self.ringer.take() {
            ringer.abort();
        }
    }
}
