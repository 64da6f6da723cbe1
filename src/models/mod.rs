pub mod city;
pub mod sight;
pub mod user;

pub use city::{City, CityInput, CityPatch};
pub use sight::{Sight, SightInput, SightPatch};
pub use user::{RegisterUser, User, UserPatch, UserProfile};
