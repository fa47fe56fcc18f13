pub mod recorder;
pub mod worker;
