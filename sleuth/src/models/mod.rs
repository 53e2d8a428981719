mod analysis;
mod research;
mod search;

pub use analysis::*;
pub use research::*;
pub use search::*;
