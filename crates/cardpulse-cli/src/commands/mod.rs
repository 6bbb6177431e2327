pub mod digest;
pub mod export;
