pub mod hero;
pub mod profile;
pub mod record;
