//! Page identity.

/// File name of the administration page.
pub const ADMIN_PAGE: &str = "admin.html";

/// The page a tab is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    path: String,
}

impl PageContext {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this is the administration page, which is never blocked.
    #[must_use]
    pub fn is_admin_page(&self) -> bool {
        self.path.contains(ADMIN_PAGE)
    }
}

impl Default for PageContext {
    fn default() -> Self {
        Self::new("/index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_page_detection() {
        assert!(PageContext::new("/admin.html").is_admin_page());
        assert!(PageContext::new("/site/admin.html").is_admin_page());
        assert!(!PageContext::new("/index.html").is_admin_page());
        assert!(!PageContext::new("/").is_admin_page());
    }
}
