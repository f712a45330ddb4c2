//! Tag vocabulary: definitions, the registry that holds them, and the parser
//! that turns tag lists into effect configs.

pub mod definition;
pub mod parser;
pub mod registry;

pub use definition::{ContextBehavior, TagCategory, TagDefinition};
pub use parser::{EffectConfig, TagList, TagParser};
pub use registry::{ConflictRules, TagRegistry};
