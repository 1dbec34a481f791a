pub mod aligner;
pub mod reference_map;
pub mod segment;
pub mod segment_tracker;
pub mod tokenizer;
pub mod utterance;
