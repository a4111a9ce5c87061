mod content_digest;

pub use content_digest::files_match;
