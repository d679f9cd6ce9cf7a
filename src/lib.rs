//! Personal reminder engine: turns extracted time descriptors into durable
//! reminder tasks, arms graduated pre-alerts (30 and 15 minutes out) plus
//! the on-time notification, survives restarts by rebuilding its timers
//! from the task store, and exposes listing and cancellation per
//! destination.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod utils;
