pub mod task;

pub use task::{ClaimOutcome, NewTask, TaskClaim, TaskRecord, TaskRow};
