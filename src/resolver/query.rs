//! The system package-metadata interface.

use crate::builder::error::BuildError;

/// Answers questions about packages registered on the system.
///
/// `Ok(None)` / `Ok(false)` mean the package (or variable) is not registered.
/// `Err` is reserved for the query mechanism itself failing, for example
/// pkg-config not being installed.
pub trait PackageQuery: Send + Sync {
    /// Whether `package` is registered.
    fn exists(&self, package: &str) -> Result<bool, BuildError>;

    /// Compiler and linker flags needed to use `package`, in tool order.
    fn flags(&self, package: &str) -> Result<Option<Vec<String>>, BuildError>;

    /// Value of a package variable such as `pkgdatadir`.
    fn variable(&self, package: &str, variable: &str) -> Result<Option<String>, BuildError>;
}
