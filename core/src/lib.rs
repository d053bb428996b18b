pub mod catalog;
pub mod config;
pub mod contact;
pub mod mime_type;
pub mod model;
pub mod processing;
pub mod storage;

#[cfg(test)]
mod test_util;
