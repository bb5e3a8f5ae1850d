//! Route advisory generation

pub mod decode;
pub mod generator;
pub mod prompt;

pub use decode::decode;
pub use generator::RouteAdvisoryGenerator;
pub use prompt::{ROUTE_ANALYSIS_INSTRUCTION, build_prompt};
