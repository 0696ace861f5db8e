pub mod attachment;
pub mod config;
pub mod generation;
pub mod logging;
pub mod mvi;
pub mod screen;
pub mod ui;
