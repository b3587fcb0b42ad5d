pub mod agenda;
pub mod calendar;
pub mod cmds;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod ui;
