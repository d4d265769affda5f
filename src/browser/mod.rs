pub mod launcher;

pub use launcher::{launch_persistent_context, ChromiumContext};
