pub mod operator;
pub mod problem;
