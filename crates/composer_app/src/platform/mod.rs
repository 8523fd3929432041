pub mod app;
pub mod cli;
mod config;
mod files;
mod persistence;
