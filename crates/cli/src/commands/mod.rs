pub mod estimate;
pub mod service;
