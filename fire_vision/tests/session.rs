use fire_vision::alert::{AlarmSounder, AlertBus, AlertEvent, AudioPlayer};
use fire_vision::pipeline::AlarmState;
use fire_vision::{FirePipeline, FireSession, Frame, PipelineConfig};
use image::{Rgb, RgbImage};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct SharedPlayer {
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl AudioPlayer for SharedPlayer {
    fn start_loop(&mut self) {
        self.log.lock().unwrap().push("start");
    }

    fn stop(&mut self) {
        self.log.lock().unwrap().push("stop");
    }
}

fn pipeline() -> FirePipeline {
    FirePipeline::new(PipelineConfig {
        image_width: 80,
        image_height: 60,
        min_area: 100,
        consecutive_frames_to_arm: 2,
        cooldown_frames_to_disarm: 2,
        ..PipelineConfig::default()
    })
    .unwrap()
}

fn frame(fire: bool) -> Frame {
    let mut image = RgbImage::from_pixel(80, 60, Rgb([25, 25, 25]));
    if fire {
        for y in 20..40 {
            for x in 20..40 {
                image.put_pixel(x, y, Rgb([255, 60, 0]));
            }
        }
    }
    Frame::from_image(image).unwrap()
}

#[tokio::test]
async fn alarm_sound_follows_the_session() {
    let player = SharedPlayer::default();
    let log = player.log.clone();
    let (mut session, _handle) = FireSession::new(pipeline(), AlarmSounder::new(player));

    let frames = futures::stream::iter(vec![
        frame(true),
        frame(true),
        frame(true),
        frame(false),
        frame(false),
    ]);
    let summary = session.run(frames).await;

    assert_eq!(summary.frames_analyzed, 5);
    assert_eq!(summary.alarm.state, AlarmState::Normal);
    assert_eq!(*log.lock().unwrap(), vec!["start", "stop"]);
}

#[tokio::test]
async fn muted_session_never_starts_the_sound() {
    let player = SharedPlayer::default();
    let log = player.log.clone();
    let (mut session, handle) = FireSession::new(pipeline(), AlarmSounder::new(player));

    handle.set_audio_enabled(false);
    session
        .run(futures::stream::iter(vec![frame(true), frame(true)]))
        .await;

    assert_eq!(session.snapshot().alarm.state, AlarmState::Alarm);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reset_during_alarm_is_seen_by_bus_subscribers() {
    let bus = AlertBus::new(16);
    let mut events = bus.subscribe();
    let (mut session, handle) = FireSession::new(pipeline(), bus);

    session.process_frame(&frame(true));
    session.process_frame(&frame(true));
    handle.reset_alarm();
    session.drain_commands();

    let mut received: Vec<AlertEvent> = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    let states: Vec<AlarmState> = received.iter().map(|event| event.state).collect();
    assert_eq!(
        states,
        vec![AlarmState::Detecting, AlarmState::Alarm, AlarmState::Normal]
    );
    let reset = received.last().unwrap();
    assert_eq!(reset.frame_index, None);
    assert_eq!(reset.previous_state, AlarmState::Alarm);
    assert_eq!(handle.snapshot().alarm.consecutive_hits, 0);
}

#[tokio::test]
async fn wrong_sized_frames_count_against_the_arming_run() {
    let (mut session, _handle) = FireSession::new(pipeline(), Vec::<AlertEvent>::new());
    let odd = Frame::from_image(RgbImage::from_pixel(40, 30, Rgb([255, 60, 0]))).unwrap();
    let frames = futures::stream::iter(vec![frame(true), odd.clone(), odd, frame(true)]);

    let summary = session.run(frames).await;

    assert_eq!(summary.frames_analyzed, 2);
    assert_eq!(summary.frames_rejected, 2);
    assert_eq!(summary.alarm.state, AlarmState::Detecting);
    let states: Vec<(Option<u64>, AlarmState)> = session
        .sink()
        .iter()
        .map(|event| (event.frame_index, event.state))
        .collect();
    assert_eq!(
        states,
        vec![
            (Some(0), AlarmState::Detecting),
            (None, AlarmState::Normal),
            (Some(1), AlarmState::Detecting),
        ]
    );
}
