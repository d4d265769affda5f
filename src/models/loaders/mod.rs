pub mod worklist_loader;

pub use worklist_loader::{extract_identifier, load_worklist, parse_worklist};
