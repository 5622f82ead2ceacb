//! Package manager abstraction.
//!
//! The [`PackageManager`] trait is what the installers drive; the real
//! implementation shells out to `brew`, tests substitute their own.

pub mod brew;

use crate::error::Result;
use crate::types::Package;

/// Installs and removes packages.
pub trait PackageManager: Send + Sync {
    /// Check if the package manager can be run.
    fn is_available(&self) -> bool;

    /// Install a package.
    fn install(&self, package: &Package) -> Result<()>;

    /// Uninstall a package.
    fn uninstall(&self, package: &Package) -> Result<()>;

    /// Re-create the links of an installed formula, replacing conflicting
    /// files.
    fn relink(&self, package: &Package) -> Result<()>;
}
