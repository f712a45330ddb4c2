//! Effect execution.
//!
//! - `EffectExecutor`: parse, resolve targets, apply per target
//! - `EffectContext`: what one call resolved, with an ordered outcome log
//! - `Mechanic`: special tags with engine behavior (lifesteal, knockback, ...)
//!
//! Missing entity capabilities never abort a call. The affected sub-step is
//! skipped with a warning and an `EffectOutcome::Skipped` entry, and the
//! remaining targets and mechanics still resolve.

mod channels;
mod context;
mod executor;
mod mechanics;

pub use context::{EffectContext, EffectOutcome};
pub use executor::{EffectExecutor, EffectRequest};
pub use mechanics::Mechanic;
