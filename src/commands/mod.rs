pub mod config;
pub mod recommend;
#[cfg(feature = "http")]
pub mod serve;
