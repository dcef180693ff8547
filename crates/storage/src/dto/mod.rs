pub mod competitor;
pub mod match_up;
