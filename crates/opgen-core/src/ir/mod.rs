pub mod manifest;
pub mod operations;

pub use manifest::{OperationManifest, from_json, from_yaml};
pub use operations::*;
