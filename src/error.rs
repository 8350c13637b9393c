use thiserror::Error;

/// Construction-time failures.
///
/// Both variants are fatal to construction; a fully constructed
/// [`HotKeyCache`](crate::HotKeyCache) never fails at runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// A rule's `match_mode` was neither `"key"` nor `"pattern"`.
    #[error("unknown cache rule mode `{0}`")]
    BadRuleMode(String),
    /// A `"pattern"` rule's value did not compile as a regular expression.
    #[error("invalid cache rule pattern `{pattern}`")]
    BadPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
