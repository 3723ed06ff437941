// THEORY:
// The `pipeline` module is the top-level API of the vision engine. It strings the
// per-frame stages together and owns the one piece of state that survives between
// frames, the alarm state machine.
//
//   Frame → segment → clean → extract → score → AlarmStateMachine → FrameReport
//
// `detect` runs only the stateless stages and can be called freely. `process`
// runs them and then advances the alarm, so it must be fed frames strictly in
// capture order. A frame that fails validation is reported as an error but
// still counts as a frame without fire, so it can break an arming run.

use crate::config::PipelineConfig;
use crate::core_modules::alarm_state_machine::AlarmStateMachine;
use crate::core_modules::color_segmenter;
use crate::core_modules::confidence_scorer::ConfidenceScorer;
use crate::core_modules::frame::frame::Frame;
use crate::core_modules::mask_cleaner::MaskCleaner;
use crate::core_modules::region_extractor::region_extractor;
use crate::error::VisionError;
use tracing::{debug, info};

// Re-export key data structures for the public API.
pub use crate::core_modules::alarm_state_machine::{AlarmSnapshot, AlarmState, Transition};
pub use crate::core_modules::candidate_mask::CandidateMask;
pub use crate::core_modules::color_segmenter::ColorBand;
pub use crate::core_modules::confidence_scorer::{ConfidenceLevel, FrameResult};
pub use crate::core_modules::region::{BoundingBox, Region};

/// Everything the pipeline learned from one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Zero-based index among the frames that were successfully analyzed.
    pub frame_index: u64,
    pub result: FrameResult,
    pub transition: Transition,
}

impl FrameReport {
    pub fn state(&self) -> AlarmState {
        self.transition.current
    }

    pub fn state_changed(&self) -> bool {
        self.transition.changed()
    }
}

/// The main, top-level struct for the vision engine.
pub struct FirePipeline {
    config: PipelineConfig,
    cleaner: MaskCleaner,
    scorer: ConfidenceScorer,
    alarm: AlarmStateMachine,
    frames_analyzed: u64,
}

impl FirePipeline {
    /// Validates the configuration and builds a pipeline in the `Normal` state.
    pub fn new(config: PipelineConfig) -> Result<Self, VisionError> {
        config.validate()?;
        Ok(Self {
            cleaner: MaskCleaner::new(config.kernel_radius),
            scorer: ConfidenceScorer::new(config.reference_area_fraction),
            alarm: AlarmStateMachine::new(
                config.consecutive_frames_to_arm,
                config.cooldown_frames_to_disarm,
            ),
            config,
            frames_analyzed: 0,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the stateless stages on one frame.
    pub fn detect(&self, frame: &Frame) -> Result<FrameResult, VisionError> {
        frame.ensure_dimensions(self.config.image_width, self.config.image_height)?;

        let mirrored;
        let frame = if self.config.mirror {
            mirrored = frame.mirrored();
            &mirrored
        } else {
            frame
        };

        // Stage 1: Color Segmentation
        let raw_mask = color_segmenter::segment(frame, &self.config.color_bands);

        // Stage 2: Noise Removal
        let clean_mask = self.cleaner.clean(&raw_mask);

        // Stage 3: Spatial Grouping
        let regions = region_extractor::extract(&clean_mask, self.config.min_area);

        // Stage 4: Scoring
        Ok(self.scorer.score(regions, frame.area()))
    }

    /// Analyzes one frame and advances the alarm by it. A frame that fails
    /// validation still advances the alarm, as a frame with no fire in it.
    pub fn process(&mut self, frame: &Frame) -> Result<FrameReport, VisionError> {
        let result = match self.detect(frame) {
            Ok(result) => result,
            Err(error) => {
                let transition = self.alarm.transition(false);
                log_transition(&transition, 0.0);
                return Err(error);
            }
        };
        let transition = self.alarm.transition(result.fire_detected);
        let frame_index = self.frames_analyzed;
        self.frames_analyzed += 1;

        debug!(
            frame_index,
            regions = result.regions.len(),
            confidence = result.confidence,
            state = %transition.current,
            "Analyzed frame"
        );
        log_transition(&transition, result.confidence);

        Ok(FrameReport {
            frame_index,
            result,
            transition,
        })
    }

    /// Returns the alarm to `Normal`, discarding any arming or cooldown progress.
    pub fn reset_alarm(&mut self) -> Transition {
        let transition = self.alarm.reset();
        info!(from = %transition.previous, "Alarm reset");
        transition
    }

    pub fn alarm_state(&self) -> AlarmState {
        self.alarm.state()
    }

    pub fn alarm_snapshot(&self) -> AlarmSnapshot {
        self.alarm.snapshot()
    }

    pub fn frames_analyzed(&self) -> u64 {
        self.frames_analyzed
    }
}

fn log_transition(transition: &Transition, confidence: f64) {
    if transition.changed() {
        info!(
            from = %transition.previous,
            to = %transition.current,
            confidence,
            "Alarm state changed"
        );
    }
}
