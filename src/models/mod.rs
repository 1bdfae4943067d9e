pub mod bar;
pub mod industry;
pub mod screen;
