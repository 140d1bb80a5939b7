pub mod config;
pub mod roulette;
