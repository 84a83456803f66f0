pub mod follow_up_scheduler;

pub use follow_up_scheduler::*;
