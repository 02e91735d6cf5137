//! Synthetic data generators.
//!
//! Every generator takes the RNG as a parameter. Request handlers pass
//! `rand::rng()` (a CSPRNG seeded from the OS); tests pass a seeded `StdRng`.

pub mod content;
pub mod number;
pub mod password;
pub mod personal;
pub mod text;
pub mod uuid;

pub use content::{BulkGenerator, ContentKind, GenerationSummary, Progress};
pub use password::{GeneratedPasswords, PasswordOptions, PasswordStrength, StrengthLevel};
pub use personal::{PersonalField, PersonalInfo, PersonalInfoOptions};
pub use uuid::{UuidFormat, UuidItem, UuidVersion};
