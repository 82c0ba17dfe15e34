pub mod error;
pub mod format;
pub mod hints;
pub mod result;

pub use error::*;
pub use format::*;
pub use hints::*;
pub use result::*;
