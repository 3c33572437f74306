pub mod builder;
pub mod stats;
pub mod view;

pub use builder::*;
pub use stats::*;
pub use view::*;
