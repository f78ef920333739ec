pub mod jsdoc;
pub mod params;
pub mod path;
pub mod printer;
pub mod url_path;

pub use jsdoc::operation_comments;
pub use params::{FunctionParam, FunctionParams};
pub use path::relative_import;
pub use printer::{PrintError, print_file};
pub use url_path::UrlPath;
