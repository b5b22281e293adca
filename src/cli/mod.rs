mod root;
mod run;
mod chat;
mod catalog;
mod export;
mod completions;

pub use root::Cli;
