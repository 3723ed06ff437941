use fire_vision::core_modules::candidate_mask::CandidateMask;
use fire_vision::core_modules::mask_cleaner::MaskCleaner;
use fire_vision::pipeline::{AlarmState, FirePipeline};
use fire_vision::{Frame, PipelineConfig};
use image::{Rgb, RgbImage};

const ORANGE_RED: Rgb<u8> = Rgb([255, 60, 0]);
const YELLOW_ORANGE: Rgb<u8> = Rgb([255, 200, 0]);
const DEEP_RED: Rgb<u8> = Rgb([255, 0, 40]);
const BACKGROUND: Rgb<u8> = Rgb([30, 30, 30]);

fn config(width: u32, height: u32) -> PipelineConfig {
    PipelineConfig {
        image_width: width,
        image_height: height,
        min_area: 500,
        ..PipelineConfig::default()
    }
}

fn frame_with_blob(width: u32, height: u32, blob: (u32, u32, u32, u32), color: Rgb<u8>) -> Frame {
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    let (x, y, w, h) = blob;
    for py in y..y + h {
        for px in x..x + w {
            image.put_pixel(px, py, color);
        }
    }
    Frame::from_image(image).unwrap()
}

#[test]
fn thousand_pixel_blob_in_a_wide_frame_is_one_region() {
    let mut pipeline = FirePipeline::new(config(854, 480)).unwrap();
    let frame = frame_with_blob(854, 480, (400, 200, 40, 25), ORANGE_RED);

    let report = pipeline.process(&frame).unwrap();
    let result = &report.result;

    assert_eq!(result.regions.len(), 1);
    let region = &result.regions[0];
    assert_eq!(region.area, 1000);
    assert_eq!(region.bounding_box.x, 400);
    assert_eq!(region.bounding_box.y, 200);
    assert_eq!(region.bounding_box.width, 40);
    assert_eq!(region.bounding_box.height, 25);
    assert!(result.fire_detected);
    assert!(result.confidence > 0.0 && result.confidence < 1.0);
    assert!((result.confidence - 1000.0 / 40_992.0).abs() < 1e-9);
    assert_eq!(report.state(), AlarmState::Alarm);
}

#[test]
fn hundred_pixel_blob_is_filtered_out() {
    let mut pipeline = FirePipeline::new(config(854, 480)).unwrap();
    let frame = frame_with_blob(854, 480, (400, 200, 10, 10), ORANGE_RED);

    let report = pipeline.process(&frame).unwrap();
    assert!(report.result.regions.is_empty());
    assert!(!report.result.fire_detected);
    assert_eq!(report.result.confidence, 0.0);
    assert_eq!(pipeline.alarm_state(), AlarmState::Normal);
}

#[test]
fn every_default_band_is_detected() {
    let pipeline = FirePipeline::new(config(120, 90)).unwrap();
    for color in [ORANGE_RED, YELLOW_ORANGE, DEEP_RED] {
        let result = pipeline
            .detect(&frame_with_blob(120, 90, (20, 20, 40, 40), color))
            .unwrap();
        assert!(result.fire_detected, "{color:?} was not detected");
        assert_eq!(result.fire_area, 1600);
    }
}

#[test]
fn frame_entirely_within_a_band_saturates_confidence() {
    let pipeline = FirePipeline::new(config(64, 48)).unwrap();
    let frame = Frame::from_image(RgbImage::from_pixel(64, 48, ORANGE_RED)).unwrap();

    let result = pipeline.detect(&frame).unwrap();
    assert!(result.fire_detected);
    assert_eq!(result.regions[0].area, 64 * 48);
    assert_eq!(result.confidence, 1.0);
}

#[test]
fn frame_without_band_pixels_scores_zero() {
    let pipeline = FirePipeline::new(config(64, 48)).unwrap();
    let colors = [Rgb([0, 0, 255]), Rgb([40, 160, 40]), Rgb([250, 250, 250]), BACKGROUND];
    for color in colors {
        let frame = Frame::from_image(RgbImage::from_pixel(64, 48, color)).unwrap();
        let result = pipeline.detect(&frame).unwrap();
        assert!(result.regions.is_empty());
        assert!(!result.fire_detected);
        assert_eq!(result.confidence, 0.0);
    }
}

#[test]
fn confidence_grows_with_blob_size() {
    let pipeline = FirePipeline::new(config(200, 150)).unwrap();
    let mut previous = 0.0;
    for side in [25, 30, 40, 55, 70, 100, 140] {
        let result = pipeline
            .detect(&frame_with_blob(200, 150, (5, 5, side, side), ORANGE_RED))
            .unwrap();
        assert!(
            result.confidence >= previous,
            "side {side}: {} < {previous}",
            result.confidence
        );
        previous = result.confidence;
    }
    assert_eq!(previous, 1.0);
}

#[test]
fn cleaning_a_noisy_mask_twice_changes_nothing() {
    let (width, height) = (80, 60);
    let mut seed: u32 = 0x2545_f491;
    let bits = (0..width * height)
        .map(|_| {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            seed >> 31 == 1
        })
        .collect();
    let mut mask = CandidateMask::from_bits(width, height, bits).unwrap();
    mask.fill_rect(10, 10, 30, 20);

    for radius in 0..=2 {
        let cleaner = MaskCleaner::new(radius);
        let once = cleaner.clean(&mask);
        assert_eq!(cleaner.clean(&once), once, "radius {radius}");
    }
}

#[test]
fn brief_occlusion_does_not_clear_the_alarm() {
    let mut pipeline = FirePipeline::new(PipelineConfig {
        cooldown_frames_to_disarm: 5,
        ..config(100, 80)
    })
    .unwrap();
    let fire = frame_with_blob(100, 80, (10, 10, 30, 30), ORANGE_RED);
    let empty = frame_with_blob(100, 80, (0, 0, 0, 0), ORANGE_RED);

    pipeline.process(&fire).unwrap();
    for _ in 0..4 {
        assert_eq!(pipeline.process(&empty).unwrap().state(), AlarmState::Alarm);
    }
    assert_eq!(pipeline.process(&fire).unwrap().state(), AlarmState::Alarm);
    for _ in 0..4 {
        pipeline.process(&empty).unwrap();
    }
    let report = pipeline.process(&empty).unwrap();
    assert!(report.state_changed());
    assert_eq!(report.state(), AlarmState::Normal);
}
