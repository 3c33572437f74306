pub mod field;
pub mod record;

pub use field::Validator;
