pub mod accumulator;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod intervals;
pub mod layout;
pub mod pipeline;
pub mod render;
