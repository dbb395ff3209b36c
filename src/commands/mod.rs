pub mod declarative;
pub mod direct;
