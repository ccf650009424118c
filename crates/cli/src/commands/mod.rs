pub mod analyze;
pub mod sections;
pub mod strategies;
pub mod util;

pub use analyze::*;
pub use sections::*;
pub use strategies::*;
pub use util::*;
