// THEORY:
// A `FireSession` is the controller that owns a running pipeline for the life of
// one video stream. It is the only place the alarm state is mutated, and it
// serializes two kinds of input:
//
// 1.  **Frames**, analyzed strictly one at a time in arrival order.
// 2.  **Commands** (reset, audio toggle, stop) from the surrounding application,
//     delivered through an mpsc queue and applied *between* frames, never in the
//     middle of one.
//
// The outside world talks to the session through a cloneable `SessionHandle`:
// commands go in through the queue, and a `watch` channel carries read-only
// `SessionSnapshot`s back out. No mutable pipeline state is ever shared.

use crate::alert::{AlertEvent, AlertSink};
use crate::core_modules::alarm_state_machine::{AlarmSnapshot, Transition};
use crate::core_modules::frame::frame::Frame;
use crate::pipeline::{FirePipeline, FrameReport};
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

const FRAME_RATE_WINDOW: usize = 30;

/// Out-of-band instructions from the surrounding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ResetAlarm,
    SetAudioEnabled(bool),
    ToggleAudio,
    Stop,
}

/// Read-only view of a running session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub alarm: AlarmSnapshot,
    /// Confidence of the most recent analyzed frame.
    pub confidence: f64,
    pub audio_enabled: bool,
    pub frames_analyzed: u64,
    pub frames_rejected: u64,
    /// Frame arrival rate over the last few frames.
    pub frames_per_second: f64,
}

/// Cloneable remote control for a `FireSession`.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Queues a command. Returns `false` once the session is gone.
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn reset_alarm(&self) -> bool {
        self.send(Command::ResetAlarm)
    }

    pub fn set_audio_enabled(&self, enabled: bool) -> bool {
        self.send(Command::SetAudioEnabled(enabled))
    }

    pub fn toggle_audio(&self) -> bool {
        self.send(Command::ToggleAudio)
    }

    pub fn stop(&self) -> bool {
        self.send(Command::Stop)
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// A receiver that can await snapshot changes.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }
}

/// Owns the pipeline and the alert sink for one video stream.
pub struct FireSession<S: AlertSink> {
    pipeline: FirePipeline,
    sink: S,
    commands: mpsc::UnboundedReceiver<Command>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    audio_enabled: bool,
    last_confidence: f64,
    frames_rejected: u64,
    arrivals: VecDeque<Instant>,
    stopped: bool,
}

impl<S: AlertSink> FireSession<S> {
    pub fn new(pipeline: FirePipeline, sink: S) -> (Self, SessionHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let initial = SessionSnapshot {
            alarm: pipeline.alarm_snapshot(),
            audio_enabled: true,
            ..SessionSnapshot::default()
        };
        let (snapshot_tx, snapshot) = watch::channel(initial);

        let session = Self {
            pipeline,
            sink,
            commands,
            snapshot_tx,
            audio_enabled: true,
            last_confidence: 0.0,
            frames_rejected: 0,
            arrivals: VecDeque::with_capacity(FRAME_RATE_WINDOW),
            stopped: false,
        };
        let handle = SessionHandle {
            commands: commands_tx,
            snapshot,
        };
        (session, handle)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Applies one command immediately.
    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::ResetAlarm => {
                let transition = self.pipeline.reset_alarm();
                self.last_confidence = 0.0;
                self.sink.publish(&AlertEvent::from_transition(transition));
            }
            Command::SetAudioEnabled(enabled) => self.apply_audio(enabled),
            Command::ToggleAudio => self.apply_audio(!self.audio_enabled),
            Command::Stop => {
                info!("Stop requested");
                self.stopped = true;
            }
        }
        self.publish_snapshot();
    }

    fn apply_audio(&mut self, enabled: bool) {
        debug!(enabled, "Audio toggled");
        self.audio_enabled = enabled;
        self.sink.set_audio_enabled(enabled);
    }

    /// Applies every command already waiting in the queue.
    pub fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.handle_command(command);
        }
    }

    /// Analyzes one frame and publishes the result. Rejected frames are logged and
    /// count as frames without fire; the sink only hears about them when they
    /// move the alarm.
    pub fn process_frame(&mut self, frame: &Frame) -> Option<FrameReport> {
        self.record_arrival(Instant::now());
        let previous = self.pipeline.alarm_state();

        let report = match self.pipeline.process(frame) {
            Ok(report) => {
                self.last_confidence = report.result.confidence;
                self.sink.publish(&AlertEvent::from_report(&report));
                Some(report)
            }
            Err(error) => {
                self.frames_rejected += 1;
                warn!(%error, "Skipping frame");
                let transition = Transition {
                    previous,
                    current: self.pipeline.alarm_state(),
                };
                if transition.changed() {
                    self.last_confidence = 0.0;
                    self.sink.publish(&AlertEvent::from_transition(transition));
                }
                None
            }
        };

        self.publish_snapshot();
        report
    }

    /// Runs until the frame source ends or a `Stop` command arrives. Pending
    /// commands always take priority over the next frame.
    pub async fn run<F>(&mut self, mut frames: F) -> SessionSnapshot
    where
        F: Stream<Item = Frame> + Unpin,
    {
        info!("Session started");
        while !self.stopped {
            tokio::select! {
                biased;
                Some(command) = self.commands.recv() => self.handle_command(command),
                next = frames.next() => match next {
                    Some(frame) => {
                        self.process_frame(&frame);
                    }
                    None => {
                        info!("Frame source exhausted");
                        break;
                    }
                },
            }
        }

        let summary = self.snapshot();
        info!(
            frames_analyzed = summary.frames_analyzed,
            frames_rejected = summary.frames_rejected,
            final_state = %summary.alarm.state,
            "Session finished"
        );
        summary
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            alarm: self.pipeline.alarm_snapshot(),
            confidence: self.last_confidence,
            audio_enabled: self.audio_enabled,
            frames_analyzed: self.pipeline.frames_analyzed(),
            frames_rejected: self.frames_rejected,
            frames_per_second: self.frames_per_second(),
        }
    }

    fn publish_snapshot(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    fn record_arrival(&mut self, now: Instant) {
        self.arrivals.push_back(now);
        if self.arrivals.len() > FRAME_RATE_WINDOW {
            self.arrivals.pop_front();
        }
    }

    fn frames_per_second(&self) -> f64 {
        let (Some(first), Some(last)) = (self.arrivals.front(), self.arrivals.back()) else {
            return 0.0;
        };
        let elapsed = last.duration_since(*first).as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.arrivals.len() - 1) as f64 / elapsed
    }
}
