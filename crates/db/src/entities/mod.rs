pub mod address;
pub mod application;
pub mod area;
pub mod image;
pub mod property;
pub mod unit;
