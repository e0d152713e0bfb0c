//! The Unicode Bidirectional Algorithm, applied line by line.
//!
//! [UAX #9: Unicode Bidirectional Algorithm](https://www.unicode.org/reports/tr9/)
//!
//! - [`context`]: the embedding stack (X1-X10)
//! - [`status`]: the state carried across line boundaries
//! - [`resolver`]: weak and neutral type resolution, run emission
//! - [`run`]: runs and their implicit levels (I1-I2)
//! - [`reorder`]: visual reordering (L2)

pub mod context;
pub mod reorder;
pub mod resolver;
pub mod run;
pub mod status;

pub use context::{BidiContext, MAX_EMBEDDING_LEVEL};
pub use reorder::reorder_runs;
pub use resolver::{BidiResolver, LineRuns};
pub use run::BidiRun;
pub use status::BidiStatus;
