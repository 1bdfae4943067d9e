pub mod base;
pub mod ths;
