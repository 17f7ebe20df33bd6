//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Invocation Model
//! - One `Delivery` from the change source is one invocation
//! - Every entity here lives and dies within a single invocation

mod batch;
mod blueprint;
mod deadletter;
mod error;
mod outcome;
mod record;
mod source;
mod transport;

pub use batch::RecordBatch;
pub use blueprint::*;
pub use deadletter::DeadletterStore;
pub use error::*;
pub use outcome::*;
pub use record::{ChangeRecord, Delivery, TypeTag};
pub use source::ChangeSource;
pub use transport::Transport;
