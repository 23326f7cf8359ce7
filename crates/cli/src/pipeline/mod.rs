//! Stage orchestrators and statistics.

mod compress;
mod extract;
mod stats;

pub use compress::CompressStage;
pub use extract::ExtractStage;
pub use stats::{CompressStats, ExtractStats};
