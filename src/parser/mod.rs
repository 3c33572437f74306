pub mod record;
pub mod value;

pub use record::*;
pub use value::*;
