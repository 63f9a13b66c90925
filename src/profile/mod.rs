pub mod services;

pub use services::{get_profile, Profile};
