pub mod page_driver;

pub use page_driver::{BrowsingContext, ChromiumPage, PageDriver};
