//! User preferences: filter selections, date-range choice and onboarding flags
//!
//! Values live in `preferences.json` as a map of key name to tagged value.
//! Consumers share one `Arc<PreferenceStore>` and observe its change subject.

pub mod keys;
pub mod store;

pub use keys::{Key, PreferenceType, PreferenceValue};
pub use store::{PreferenceChange, PreferenceStore};
