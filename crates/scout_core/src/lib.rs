//! Taskscout core: data model, pure interaction state machine and export text.
mod effect;
mod error;
mod export;
mod model;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::SearchError;
pub use export::{clipboard_text, csv_text, CsvDialect, CSV_FILENAME, CSV_HEADER, MISSING_FIELD};
pub use model::{JobHandle, JobStatus, ResultItem, SearchParameters, StatusClass, DATE_FORMAT};
pub use msg::{ExportOutcome, Msg};
pub use state::{AppState, Notice, Phase, Severity};
pub use update::update;
pub use view_model::{AppViewModel, ResultCardView};
