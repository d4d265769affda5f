pub mod capture;
pub mod document;
pub mod loaders;
pub mod work_item;

pub use capture::{CaptureOutcome, CaptureResult, RunStatistics};
pub use document::{AssembledDocument, AssemblySummary, PageSize};
pub use loaders::{load_worklist, parse_worklist};
pub use work_item::WorkItem;
