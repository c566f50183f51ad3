pub mod hit_testing;
pub mod mapping;

pub use mapping::{CoordinateMapper, buffer_size_for};
