pub mod chart;
pub mod coin;
pub mod ticker;

pub use chart::*;
pub use coin::*;
pub use ticker::*;
