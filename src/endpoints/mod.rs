pub mod constants;
pub mod player;
