pub mod addresses;
pub mod applications;
pub mod areas;
pub mod config;
pub mod drafts;
pub mod health;
pub mod properties;
pub mod property_deletion;
pub mod units;
