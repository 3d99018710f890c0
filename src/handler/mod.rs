//! Consumers on the receiving end of the worker channels.

mod progress;
mod result;

pub use progress::{format_count, format_number, ProgressAggregator};
pub use result::{KeystoreExport, PersistenceError, ResultHandler};
