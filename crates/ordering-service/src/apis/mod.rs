//! Handler modules for the ordering API.

/// Order endpoints: create, read, list, status update, admin listing.
pub mod orders;
