pub mod composer;
pub mod error;
pub mod generator;
pub mod mutation;
pub mod options;
pub mod schema_type;

pub use error::SwrError;
pub use generator::SwrGenerator;
pub use mutation::{MutationTemplate, SwrMutationTemplate};
pub use options::{DataReturnType, SwrOptions};
