#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

extern crate alloc;

pub mod attempt;
pub mod calibration;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod firebase;
pub mod http;
pub mod node;
pub mod radio;
pub mod reading;
pub mod selector;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

pub use catalog::{Candidate, NetworkIdentity};
pub use node::{Node, NodeConfig, TickError};
