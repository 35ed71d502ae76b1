pub mod geometry;
pub mod grid;
pub mod level;
pub mod runner;
pub mod scene;
pub mod time;
