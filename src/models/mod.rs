// Core data types for the scoring pipeline

pub mod descriptor;
pub mod landmark;
pub mod score;
pub mod video;

pub use descriptor::*;
pub use landmark::*;
pub use score::*;
pub use video::*;
