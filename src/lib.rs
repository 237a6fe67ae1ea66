pub mod api;
pub mod commands;
pub mod config;
pub mod decoders;
pub mod domain;
pub mod screens;
pub mod session;
pub mod terminal;
