pub mod enroll;
pub mod profile;
pub mod verify;
