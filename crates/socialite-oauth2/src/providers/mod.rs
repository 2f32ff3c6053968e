// Provider drivers.
//
// Each driver composes a `DriverBase` and implements `SocialiteDriver` with
// its own endpoints and reply parsing.

pub mod qq;
pub use qq::QqDriver;
