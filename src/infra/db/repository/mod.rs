//! Repository implementations for data access in ComplaintPro.

mod complaint;

pub use complaint::ComplaintRepository;

use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;

pub type DbConn = Arc<Mutex<Connection>>;
