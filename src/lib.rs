//! Static build-node profiles for provisioning Jenkins agents.
//!
//! This crate is a read-only registry: a table of named node profiles
//! (base image, flavor, cloud provider, SSH keypair, scheduling labels,
//! and a templated bootstrap script) that an external provisioning tool
//! consumes when it creates build-agent VMs. The table is fixed at load
//! time; the only runtime operations are lookup, enumeration, and
//! rendering a profile's bootstrap script for one concrete instance.

pub mod domain;
pub mod registry;

pub use domain::error::ProfileError;
pub use domain::profile::NodeProfile;
pub use registry::ProfileRegistry;
