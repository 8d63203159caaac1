pub mod constants;
pub mod geo;
pub mod memory;
pub mod view_state;
