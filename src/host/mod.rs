//! Host-facing contract and stdio bridge for launcher shell integration.

pub mod channel;
pub mod contract;
pub mod stdio;
