//! Gateway token persistence for paired devices.
//!
//! Provides:
//! - Canonical record addressing per (device id, role) pair
//! - Role and scope normalization before addressing or persisting
//! - Store / load / clear-one / clear-all record lifecycle against a
//!   secure secret store
//!
//! ## Design Decisions
//! - Replace-on-store: writing to an occupied address is an explicit
//!   delete-then-add, so at most one record exists per (device, role) and
//!   a repeated store is idempotent.
//! - Invalid stored data is treated as absent: a corrupted record behaves
//!   exactly like a missing one, and the caller re-authenticates.
//! - No operation surfaces an error: failures resolve to `None` or a
//!   best-effort no-op, with diagnostics logged for operator visibility.

pub mod entry;
pub mod keys;
pub mod store;

pub use entry::DeviceAuthEntry;
pub use store::DeviceAuthStore;
