pub mod fetcher;
pub mod metrics;
pub mod normalizer;
pub mod renderer;
