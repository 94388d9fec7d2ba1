pub mod scope;
pub mod search;

pub use scope::{retain_visible, visible, View};
pub use search::SearchQuery;
