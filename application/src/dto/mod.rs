pub mod enroll;
pub mod verify;

pub use enroll::*;
pub use verify::*;
