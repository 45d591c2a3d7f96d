#![forbid(unsafe_code)]

pub mod draft;
pub mod list;
pub mod model;
pub mod storage;
pub mod store;
