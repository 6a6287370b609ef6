#![allow(clippy::useless_conversion)]

pub mod address;
pub mod application;
pub mod area;
pub mod ids;
pub mod image;
pub mod property;
pub mod unit;
