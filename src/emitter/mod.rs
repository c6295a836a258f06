//! Client-side counterpart of the capture route: assembles
//! tracking events from page signals (cookies, url) and delivers
//! them to the relay, firing one automatic PageView per mount.

mod client;
pub mod cookies;
pub mod ids;
pub mod transport;

pub use client::{DeliveryReport, EventEmitter, PageSignals};
pub use transport::{HttpRelayTransport, RelayTransport};
