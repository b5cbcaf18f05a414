mod license;
mod license_code;

pub use license::*;
pub use license_code::*;
