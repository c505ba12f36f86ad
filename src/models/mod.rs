pub mod preferences;
pub mod profile;

pub use preferences::{ActivityPreferences, MealPreferences};
pub use profile::{Profile, UserIdentity};
