//! Environment-specific bundler configuration.
//!
//! [`BuildConfigFactory`] turns a set of [`BuildParameters`] into the client
//! configuration, or the client/server pair, that an rspack/webpack style
//! bundler consumes. [`library::build_library_config`] covers single-entry
//! Node packages.

pub mod confirm;
pub mod context;
pub mod env_file;
pub mod error;
pub mod factory;
pub mod library;
pub mod params;
pub mod port;
pub mod project;
pub mod resolved;
pub mod transform;

pub use confirm::{AutoConfirm, ConfirmationProvider, ScriptedAnswer, is_affirmative};
pub use context::{DeploymentContext, Execution, Region, RegionalPath, TelemetrySettings};
pub use error::{ConfigError, Result};
pub use factory::{BuildConfigFactory, FactoryOutput};
pub use library::{LibraryParameters, build_library_config};
pub use params::{BuildParameters, CopyPattern};
pub use port::{PortNegotiation, PortProbe, TcpPortProbe, negotiate_port};
pub use project::ProjectConfig;
pub use resolved::{BuildOutput, EntryMap, Mode, PluginDescriptor, ResolvedConfiguration, Target, Variant};
pub use transform::TransformOptions;
