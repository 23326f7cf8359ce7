//! Command implementations.

mod compress;
mod extract;
mod info;
mod validate;

pub use compress::run_compress;
pub use extract::run_extract;
pub use info::run_info;
pub use validate::run_validate;
