//! Typst World trait implementation for in-memory compilation

pub mod virtual_world;

pub use virtual_world::VirtualWorld;
