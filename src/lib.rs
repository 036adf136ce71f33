// Library for tests to access modules

pub mod assembler;
pub mod cli;
pub mod config;
pub mod error;
pub mod metric_source;
pub mod models;
pub mod partition_repo;
pub mod retention;
pub mod worker;
