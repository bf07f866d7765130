//! The consistent hash ring.
//!
//! This module implements the ring itself: a sorted circle of node positions
//! plus per-node ownership bookkeeping. Each physical node holds exactly one
//! position (no virtual-node multiplicity); a key belongs to the node whose
//! position is the smallest position greater than or equal to the key's hash,
//! wrapping around at the top of the 32-bit space.
//!
//! ```text
//!        ┌── pos 10 (A) ◄─ keys (90, 2^32] ∪ [0, 10]
//!        │
//!   ─────┼── pos 50 (B) ◄─ keys (10, 50]
//!        │
//!        └── pos 90 (C) ◄─ keys (50, 90]
//! ```
//!
//! # Example
//!
//! ```rust
//! use ringleader::ring::Ring;
//!
//! let ring = Ring::new();
//! ring.add_node("cache-1").unwrap();
//! ring.add_node("cache-2").unwrap();
//!
//! let location = ring.owner_of(b"user:123").unwrap();
//! println!("{} owns hash {}", location.node, location.hash);
//! ```

mod hashring;

pub use hashring::Ring;
