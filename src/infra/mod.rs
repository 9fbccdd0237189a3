mod api;
mod config;
mod logging;
#[cfg(test)]
pub(crate) mod stub_server;

pub use api::*;
pub use config::*;
pub use logging::*;
