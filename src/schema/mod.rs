pub mod catalog;
pub mod dependencies;
pub mod tables;
pub mod types;

pub use catalog::*;
pub use dependencies::*;
pub use tables::*;
pub use types::*;
