pub mod controller;
pub mod host;
pub mod mapping;
pub mod persistence;
