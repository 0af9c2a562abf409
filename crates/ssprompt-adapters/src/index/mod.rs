//! Package index adapters.

mod pypi;

pub use pypi::{DEFAULT_INDEX_URL, PypiIndex};
