//! Domain types for ComplaintPro.
//! Defines the records, label schemes and category taxonomy the classifier works with.

pub mod error;
pub mod label_scheme;
pub mod record;
pub mod sentiment;
pub mod taxonomy;

pub use error::*;
pub use label_scheme::*;
pub use record::*;
pub use sentiment::*;
pub use taxonomy::*;
