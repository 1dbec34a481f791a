pub mod audio;
pub mod pipeline;
pub mod provider;
pub mod scoring;
pub mod shared;
