pub mod balance;
pub mod settings;
