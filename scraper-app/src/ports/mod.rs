pub mod browser;
pub mod email;
#[cfg(any(test, feature = "test-util"))]
pub mod mocks;
pub mod report;
