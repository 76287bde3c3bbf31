//! # refract-core
//!
//! Entity schema model for the Refract API compiler.
//!
//! - [`property`] - the property type algebra (`String`, `Number`, `Boolean`,
//!   `Date`, `Shape`, `Array`, entity references)
//! - [`entity`] - entity schemas with display metadata and the `max_one` flag
//! - [`catalog`] - alias-keyed set of schemas, loadable from TOML or JSON

pub mod catalog;
pub mod entity;
pub mod error;
pub mod id;
pub mod property;
pub mod time;

pub use catalog::EntityCatalog;
pub use entity::{EntitySchema, is_valid_graphql_name};
pub use error::{CoreError, ErrorCategory, Result};
pub use id::{ID_FIELD, generate_id};
pub use property::{DescriptorError, PropertyOptions, PropertyType, ScalarKind};
pub use time::{compare_datetimes, parse_datetime};
