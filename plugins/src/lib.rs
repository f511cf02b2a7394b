pub mod backend;
pub mod factory;

pub use factory::build_registry;
