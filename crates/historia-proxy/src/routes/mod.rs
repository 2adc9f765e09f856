pub mod completion;
pub mod health;
