pub mod decoder;
pub mod input;
pub mod recorder;
pub mod sink;
