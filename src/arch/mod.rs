pub mod hw;
pub mod module;
