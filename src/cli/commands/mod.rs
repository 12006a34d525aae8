pub mod backup;
pub mod config;
pub mod db;
pub mod export;
pub mod extra;
pub mod init;
pub mod log;
pub mod restore;
pub mod site;
pub mod timer;
pub mod visit;
pub mod weeding;
