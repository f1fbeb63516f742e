mod registry;
mod section;

pub use registry::*;
pub use section::*;
