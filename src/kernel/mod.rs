pub mod appearance;
pub mod cancel;
pub mod debug;
pub mod error;
pub mod event;
pub mod mood;
pub mod phrases;
pub mod presence;
pub mod reactor;
pub mod scheduler;
pub mod state;
pub mod telemetry;
