pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod elo;
pub mod error;
pub mod evaluation;
pub mod experiment;
pub mod export;
pub mod game_log;
pub mod history_db;
pub mod opponent;
pub mod rolling;
pub mod rpi;
pub mod synthetic;
pub mod teams;
