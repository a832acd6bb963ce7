pub mod send;
pub mod validate;
