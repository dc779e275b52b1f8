//! Domain models for the rehab-ledger system.

mod employee;
mod expense;
mod money;
mod patient;
mod payment;
mod period;
mod settings;

pub use employee::*;
pub use expense::*;
pub use money::*;
pub use patient::*;
pub use payment::*;
pub use period::*;
pub use settings::*;
