pub mod errors;
pub mod projection;
pub mod row;
