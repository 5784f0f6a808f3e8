pub mod api;
pub mod jobs;
pub mod maps;
pub mod storage;
pub mod worker;
