//! Alert de-duplication: which alert keys fired when, and for how long they
//! suppress a repeat.

pub mod key;
pub mod persistence;
pub mod store;

pub use key::{AlertKey, CooldownWindows, pct_band, signed_pct_band};
pub use persistence::CooldownPersistence;
pub use store::CooldownStore;
