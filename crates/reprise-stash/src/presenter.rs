//! The presenter side of a restore: flash message context.

/// Query parameter carrying the flash message id across a redirect.
pub const FLASH_KEY: &str = "_fid";

/// The handler performing a restore.
pub trait Presenter {
    /// Whether a flash (one-shot message) context is active for this request.
    fn has_flash_session(&self) -> bool;

    /// Value of a named request parameter.
    fn parameter(&self, name: &str) -> Option<String>;
}

impl<T: Presenter + ?Sized> Presenter for &T {
    fn has_flash_session(&self) -> bool {
        (**self).has_flash_session()
    }

    fn parameter(&self, name: &str) -> Option<String> {
        (**self).parameter(name)
    }
}
