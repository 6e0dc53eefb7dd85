//! Vector capability: detection, enablement, and hardware parameters.

mod capability;

pub use capability::{detect, report, ActiveVector, DetectedVector, VectorContext, REPORT_CONFIGS};
pub use tandem_io::{Lmul, Sew, VType, VectorUnit};
