pub mod color;
pub mod host_address;
pub mod interaction;
pub mod math;
pub mod selector;
pub mod weather;
