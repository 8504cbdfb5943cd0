pub mod store;

pub use store::{load, save, write_json, SnapshotError};
