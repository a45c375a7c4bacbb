//! System library resolution.
//!
//! Turns library names into the compiler/linker flags needed to use them,
//! and checks that prerequisite packages are installed.

pub mod pkgconfig;
pub mod query;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::builder::error::BuildError;

pub use pkgconfig::PkgConfig;
pub use query::PackageQuery;

/// A resolved external library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub name: String,
    /// Flags in the order the package metadata lists them
    pub flags: Vec<String>,
}

/// Resolves library names against system package metadata.
///
/// Results are cached per name for the lifetime of the resolver, so a name
/// resolves to the same flags however many times it is asked for.
pub struct DependencyResolver {
    query: Arc<dyn PackageQuery>,
    cache: Mutex<HashMap<String, Dependency>>,
}

impl DependencyResolver {
    pub fn new(query: Arc<dyn PackageQuery>) -> Self {
        DependencyResolver {
            query,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve one library to its flags.
    ///
    /// An unregistered library is always a [`BuildError::MissingDependency`],
    /// never an empty flag list.
    pub fn resolve(&self, name: &str) -> Result<Dependency, BuildError> {
        if let Some(dep) = self.lock_cache().get(name) {
            return Ok(dep.clone());
        }

        let flags = self
            .query
            .flags(name)?
            .ok_or_else(|| BuildError::missing(name))?;

        tracing::debug!("resolved `{}` -> {}", name, flags.join(" "));

        let dep = Dependency {
            name: name.to_string(),
            flags,
        };
        self.lock_cache().insert(name.to_string(), dep.clone());
        Ok(dep)
    }

    /// Resolve several libraries, keeping their order. Stops at the first failure.
    pub fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Dependency>, BuildError> {
        names.iter().map(|n| self.resolve(n.as_ref())).collect()
    }

    /// Fail unless `name` is registered, without resolving its flags.
    pub fn assert_installed(&self, name: &str) -> Result<(), BuildError> {
        if self.lock_cache().contains_key(name) || self.query.exists(name)? {
            Ok(())
        } else {
            Err(BuildError::missing(name))
        }
    }

    /// Look up a directory-valued package variable, e.g. `pkgdatadir`.
    pub fn package_dir(&self, package: &str, variable: &str) -> Result<PathBuf, BuildError> {
        match self.query.variable(package, variable)? {
            Some(value) => Ok(PathBuf::from(value)),
            None => Err(BuildError::missing(package)),
        }
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Dependency>> {
        // The map is only ever inserted into; a poisoned guard still holds valid data.
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}
