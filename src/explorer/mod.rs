// Explorer module - cached, rate-limited access to explorer APIs
// Normalizes the two known provider response shapes into one canonical record

mod cache;
mod limiter;
mod provider;
mod service;

pub use cache::*;
pub use limiter::*;
pub use provider::*;
pub use service::*;
