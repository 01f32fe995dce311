//! Application nodes and their version history.
//!
//! An [`ApplicationNode`] is the root of a manifest tree. It expands lazily
//! into [`PackageDescriptor`](crate::package::PackageDescriptor)s and child
//! nodes, and every recursive operation walks the tree depth first.

mod info;
mod node;
mod population;
mod versions;

pub use info::ApplicationInfo;
pub use node::ApplicationNode;
pub use population::Population;
pub use versions::{AvailableVersions, VersionEntry};
