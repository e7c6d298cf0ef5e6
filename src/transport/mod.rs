pub mod traits;
pub mod tcp;
pub mod serial;

pub use traits::*;
pub use tcp::*;
pub use serial::*;
