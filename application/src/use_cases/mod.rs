//! Use cases — the orchestration entry points of the application layer

pub mod process_task;
