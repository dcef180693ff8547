mod category;
mod competitor;
mod gender;
mod match_up;

pub use category::{ADULT_AGE, Category, age_on};
pub use competitor::Competitor;
pub use gender::Gender;
pub use match_up::MatchUp;
