mod bootstrap;

pub use bootstrap::run;
