//! Taskscout engine: remote job IO, polling policy and effect execution.
mod api;
mod engine;
mod persist;
mod pipeline;
mod poll;
mod settings;
mod types;

pub use api::{ApifyClient, JobApi};
pub use engine::EngineHandle;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::run_search;
pub use poll::{poll_until_succeeded, Backoff, Clock, RetryPolicy, TokioClock};
pub use settings::{ApiSettings, DEFAULT_BASE_URL};
pub use types::{ApiError, ChannelProgressSink, EngineEvent, FailureKind, ProgressSink};
