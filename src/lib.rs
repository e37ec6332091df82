pub mod app;
pub mod cli;
pub mod config;
pub mod git;
pub mod lang;
pub mod output;
pub mod report;
pub mod scan;
pub mod scanner;
