//! Application-wide constants
//!
//! Centralized location for limits and placeholder strings that are used
//! across the loader, the tree builder and the view layer.

/// Deepest indentation a reply can get. Deeper replies keep their position
/// in the order but are drawn at this level.
pub const MAX_INDENT_LEVEL: u32 = 19;

/// Placeholder shown when a reply names a parent author that is blank.
pub const UNKNOWN_REPLY_NAME: &str = "...";

/// Default width of one indentation step, in device-independent pixels.
pub const INDENT_UNIT_DP: u32 = 10;

// Path segments used by GNU social permalinks
pub mod gnu_social {
    /// Public notices
    pub const NOTICE_PATH: &str = "notice";
    /// Private (direct) messages
    pub const MESSAGE_PATH: &str = "message";
}
