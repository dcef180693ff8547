pub mod division;
pub mod pairing;
