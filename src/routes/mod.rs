pub mod health;
pub mod playlist;
