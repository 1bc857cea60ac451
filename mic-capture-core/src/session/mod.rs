//! Capture session and the controller state machine that drives it.

pub mod capture;
pub mod controller;
