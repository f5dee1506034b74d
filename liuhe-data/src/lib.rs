pub mod load;
pub mod models;
