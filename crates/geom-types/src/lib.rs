pub mod bbox;
pub mod dimension;
pub mod point;
pub mod tolerance;

pub use bbox::*;
pub use dimension::*;
pub use point::*;
pub use tolerance::*;
