//! Domain models for the pocket-doctor system.

mod parameter;
mod reference;
mod report;

pub use parameter::*;
pub use reference::*;
pub use report::*;
