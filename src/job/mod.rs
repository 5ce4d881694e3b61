//! Job protocol: request parsing, validation and response shaping.

pub mod request;
pub mod response;
pub mod validator;

pub use request::{JobEnvelope, JobInput, SynthesisRequest, parse_job};
pub use response::JobOutput;
pub use validator::validate;
