pub mod results;
pub mod sessions;
