mod amount;
mod entry;
mod fee;
mod summary;

pub use amount::*;
pub use entry::*;
pub use fee::*;
pub use summary::*;
