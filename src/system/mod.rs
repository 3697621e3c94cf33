//! Core system components shared by the demos
pub mod clock;
pub mod event;
pub mod fs;
pub mod log;
pub mod net;
pub mod orchestrator;
pub mod resources;
pub mod state;
pub mod storage;
