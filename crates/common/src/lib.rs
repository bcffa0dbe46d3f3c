pub mod address;
pub mod config;
pub mod utils;

pub use address::Address;
