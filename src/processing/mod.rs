pub mod edges;
pub mod periods;
pub mod statistics;
pub mod threshold;
