pub mod competitors;
pub mod divisions;
pub mod matches;
pub mod session;
