//! Session-related constants.

/// Session keys.
pub mod keys {
    /// Key for storing the logged-in user's ID.
    pub const USER_ID: &str = "user_id";

    /// Key written by the session demo endpoint.
    pub const FOOBAR: &str = "foobar";
}
