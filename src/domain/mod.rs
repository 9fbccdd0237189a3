mod normalize;
mod types;

pub use normalize::*;
pub use types::*;
