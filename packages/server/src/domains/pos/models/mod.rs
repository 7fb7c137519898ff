pub mod pos;

pub use pos::{CreatePos, Pos};
