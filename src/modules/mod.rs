pub mod logger;
pub mod permissions;
pub mod scheduler;
pub mod storage;
