//! # Utility Functions Module
//!
//! Small helpers for building external command lines.

/// Converts any iterable of string-like items to `Vec<String>`.
///
/// # Example
/// ```rust,ignore
/// use crate::utils::to_string_vec;
///
/// let crf = 26.to_string();
/// let args = to_string_vec(["-crf", crf.as_str(), "-preset", "medium"]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Builds an argument vector from `&str` items.
///
/// # Example
/// ```rust,ignore
/// use crate::args;
///
/// let args = args!["-y", "-i", input, "-vcodec", "libx264"];
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::utils::to_string_vec::<&str, _>([$($item),*])
    };
}
