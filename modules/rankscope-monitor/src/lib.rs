pub mod export;
pub mod monitor;

pub use export::export_run;
pub use monitor::Monitor;
