pub mod config;
pub mod drafts;
pub mod image;
pub mod notify;
pub mod storage;
