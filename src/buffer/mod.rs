pub mod generate;
pub mod vec;
