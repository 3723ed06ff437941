// THEORY:
// The `alert` module is the boundary between the analysis core and the
// collaborators that make noise and draw pictures. The core never calls a window
// or a speaker directly; it publishes immutable `AlertEvent`s to an `AlertSink`.
//
// 1.  **AlertSink** is the seam. Sinks receive one event per analyzed frame and
//     must tolerate the same state arriving repeatedly.
// 2.  **AlertBus** moves events across a task boundary through a broadcast
//     channel, so display and audio consumers can run on their own tasks
//     without touching pipeline internals.
// 3.  **AlarmSounder** holds the audio rules: loop while the alarm is raised and
//     audio is enabled, stay silent otherwise.

use crate::core_modules::alarm_state_machine::{AlarmState, Transition};
use crate::core_modules::confidence_scorer::ConfidenceLevel;
use crate::core_modules::region::Region;
use crate::pipeline::FrameReport;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

/// What alert consumers see for each analyzed frame, or for a reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Index of the analyzed frame, `None` for resets and rejected frames.
    pub frame_index: Option<u64>,
    pub state: AlarmState,
    pub previous_state: AlarmState,
    pub confidence: f64,
    pub fire_detected: bool,
    pub regions: Vec<Region>,
}

impl AlertEvent {
    pub fn from_report(report: &FrameReport) -> Self {
        Self {
            frame_index: Some(report.frame_index),
            state: report.transition.current,
            previous_state: report.transition.previous,
            confidence: report.result.confidence,
            fire_detected: report.result.fire_detected,
            regions: report.result.regions.clone(),
        }
    }

    /// An event not tied to an analyzed frame: a user reset, or a rejected frame
    /// that moved the alarm.
    pub fn from_transition(transition: Transition) -> Self {
        Self {
            frame_index: None,
            state: transition.current,
            previous_state: transition.previous,
            confidence: 0.0,
            fire_detected: false,
            regions: Vec::new(),
        }
    }

    pub fn state_changed(&self) -> bool {
        self.state != self.previous_state
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }
}

/// Receives alarm output from the session.
pub trait AlertSink {
    /// Called once per analyzed frame and on every reset.
    fn publish(&mut self, event: &AlertEvent);

    /// Audio was switched on or off by the user.
    fn set_audio_enabled(&mut self, _enabled: bool) {}
}

impl<S: AlertSink + ?Sized> AlertSink for Box<S> {
    fn publish(&mut self, event: &AlertEvent) {
        (**self).publish(event)
    }

    fn set_audio_enabled(&mut self, enabled: bool) {
        (**self).set_audio_enabled(enabled)
    }
}

impl<A: AlertSink, B: AlertSink> AlertSink for (A, B) {
    fn publish(&mut self, event: &AlertEvent) {
        self.0.publish(event);
        self.1.publish(event);
    }

    fn set_audio_enabled(&mut self, enabled: bool) {
        self.0.set_audio_enabled(enabled);
        self.1.set_audio_enabled(enabled);
    }
}

/// Collects events in memory; handy for tests and offline runs.
impl AlertSink for Vec<AlertEvent> {
    fn publish(&mut self, event: &AlertEvent) {
        self.push(event.clone());
    }
}

/// Fans events out to any number of consumer tasks.
#[derive(Clone)]
pub struct AlertBus {
    pub events_tx: broadcast::Sender<AlertEvent>,
    pub audio_tx: watch::Sender<bool>,
}

impl AlertBus {
    pub fn new(capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel::<AlertEvent>(capacity.max(1));
        let (audio_tx, _) = watch::channel(true);
        Self {
            events_tx,
            audio_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.events_tx.subscribe()
    }

    pub fn subscribe_audio(&self) -> watch::Receiver<bool> {
        self.audio_tx.subscribe()
    }
}

impl AlertSink for AlertBus {
    fn publish(&mut self, event: &AlertEvent) {
        // No subscribers is not an error; the event is simply dropped.
        let _ = self.events_tx.send(event.clone());
    }

    fn set_audio_enabled(&mut self, enabled: bool) {
        self.audio_tx.send_replace(enabled);
    }
}

/// Something that can loop an alert sound.
pub trait AudioPlayer {
    fn start_loop(&mut self);
    fn stop(&mut self);
}

/// Drives an `AudioPlayer` from alarm events.
pub struct AlarmSounder<P: AudioPlayer> {
    player: P,
    enabled: bool,
    playing: bool,
    alarm_active: bool,
}

impl<P: AudioPlayer> AlarmSounder<P> {
    pub fn new(player: P) -> Self {
        Self {
            player,
            enabled: true,
            playing: false,
            alarm_active: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    fn sync(&mut self) {
        let should_play = self.enabled && self.alarm_active;
        if should_play && !self.playing {
            info!("Starting alarm sound");
            self.player.start_loop();
            self.playing = true;
        } else if !should_play && self.playing {
            info!("Stopping alarm sound");
            self.player.stop();
            self.playing = false;
        }
    }
}

impl<P: AudioPlayer> AlertSink for AlarmSounder<P> {
    fn publish(&mut self, event: &AlertEvent) {
        self.alarm_active = event.state.is_alarm();
        self.sync();
    }

    fn set_audio_enabled(&mut self, enabled: bool) {
        debug!(enabled, "Audio toggled");
        self.enabled = enabled;
        self.sync();
    }
}

impl<P: AudioPlayer> Drop for AlarmSounder<P> {
    fn drop(&mut self) {
        if self.playing {
            self.player.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingPlayer {
        starts: usize,
        stops: usize,
    }

    impl AudioPlayer for CountingPlayer {
        fn start_loop(&mut self) {
            self.starts += 1;
        }

        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    fn event(previous: AlarmState, state: AlarmState) -> AlertEvent {
        AlertEvent::from_transition(Transition {
            previous,
            current: state,
        })
    }

    #[test]
    fn sound_follows_the_alarm_and_ignores_repeats() {
        let mut sounder = AlarmSounder::new(CountingPlayer::default());
        sounder.publish(&event(AlarmState::Normal, AlarmState::Detecting));
        assert!(!sounder.is_playing());

        sounder.publish(&event(AlarmState::Detecting, AlarmState::Alarm));
        sounder.publish(&event(AlarmState::Alarm, AlarmState::Alarm));
        sounder.publish(&event(AlarmState::Alarm, AlarmState::Alarm));
        assert!(sounder.is_playing());
        assert_eq!(sounder.player().starts, 1);

        sounder.publish(&event(AlarmState::Alarm, AlarmState::Normal));
        assert!(!sounder.is_playing());
        assert_eq!(sounder.player().stops, 1);
    }

    #[test]
    fn disabling_audio_silences_an_active_alarm_until_re_enabled() {
        let mut sounder = AlarmSounder::new(CountingPlayer::default());
        sounder.publish(&event(AlarmState::Normal, AlarmState::Alarm));
        sounder.set_audio_enabled(false);
        assert!(!sounder.is_playing());

        sounder.publish(&event(AlarmState::Alarm, AlarmState::Alarm));
        assert!(!sounder.is_playing());

        sounder.set_audio_enabled(true);
        assert!(sounder.is_playing());
        assert_eq!(sounder.player().starts, 2);
        assert_eq!(sounder.player().stops, 1);
    }

    #[test]
    fn tuple_sinks_receive_both_calls() {
        let mut sinks = (Vec::<AlertEvent>::new(), Vec::<AlertEvent>::new());
        sinks.publish(&event(AlarmState::Normal, AlarmState::Alarm));
        assert_eq!(sinks.0.len(), 1);
        assert_eq!(sinks.1.len(), 1);
        assert!(sinks.0[0].state_changed());
    }

    #[tokio::test]
    async fn bus_delivers_events_to_other_tasks() {
        let mut bus = AlertBus::new(8);
        let mut events = bus.subscribe();
        let mut audio = bus.subscribe_audio();

        let consumer = tokio::spawn(async move { events.recv().await });
        bus.publish(&event(AlarmState::Normal, AlarmState::Alarm));
        bus.set_audio_enabled(false);

        let received = consumer.await.unwrap().unwrap();
        assert_eq!(received.state, AlarmState::Alarm);
        audio.changed().await.unwrap();
        assert!(!*audio.borrow());
    }

    #[test]
    fn bus_without_subscribers_does_not_fail() {
        let mut bus = AlertBus::new(1);
        bus.publish(&event(AlarmState::Normal, AlarmState::Alarm));
    }
}
