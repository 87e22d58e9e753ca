//! Rolling aggregation of classified complaints for live dashboards.

pub mod shared;
pub mod summary;
pub mod window;

pub use shared::SharedWindow;
pub use summary::{WindowSummary, term_frequencies};
pub use window::{DEFAULT_CAPACITY, RollingWindow};
