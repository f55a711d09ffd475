mod config;
mod net;
mod platform;
mod runtime;

pub use runtime::run;
