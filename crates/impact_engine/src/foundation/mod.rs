//! Foundation utilities: math types, simulation time, and logging

pub mod logging;
pub mod math;
pub mod time;
