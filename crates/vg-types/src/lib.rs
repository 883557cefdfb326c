//! Foundation types for videogate.
//!
//! Every other videogate crate depends on `vg-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Caller-supplied key of a stored video
//! - [`UserId`] -- Identifier assigned to a user at sign-up
//! - [`Identity`] -- Verified (user id, username) pair carried by a call
//! - [`VideoMetadata`] -- Record attached to every committed upload

pub mod error;
pub mod identity;
pub mod metadata;
pub mod object;

pub use error::TypeError;
pub use identity::{Identity, UserId};
pub use metadata::VideoMetadata;
pub use object::{ObjectId, MAX_OBJECT_ID_LEN};
