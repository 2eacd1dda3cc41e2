pub mod me;
pub mod secrets;
