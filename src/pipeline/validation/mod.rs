pub mod types;
pub mod validator;
pub mod completeness;

pub use types::*;
pub use validator::*;
pub use completeness::*;
