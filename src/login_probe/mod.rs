pub mod probe;
pub mod report;
pub mod result;
pub mod runner;

pub mod prelude {
    pub use super::probe::{AttemptOutcome, send_attempt};
    pub use super::result::{
        AttemptResult, Classification, RetryAfter, Summary, TransportFailure,
    };
    pub use super::runner::ProbeRunner;
}
