//! High-level client wiring shared by every frontend.

mod client;

pub use client::JotClient;
