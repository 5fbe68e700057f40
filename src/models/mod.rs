pub mod snapshot;
pub mod valuation;
pub mod response;

pub use snapshot::*;
pub use valuation::*;
pub use response::*;
