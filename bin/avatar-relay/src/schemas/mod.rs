pub mod relay;
pub mod task;
