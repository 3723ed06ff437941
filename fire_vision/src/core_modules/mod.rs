pub mod alarm_state_machine;
pub mod candidate_mask;
pub mod color_segmenter;
pub mod confidence_scorer;
pub mod frame;
pub mod mask_cleaner;
pub mod pixel;
pub mod region;
pub mod region_extractor;
