mod health_check;
pub mod swift_codes;

pub use health_check::*;
