pub mod admin;
pub mod api;
pub mod chat;
pub mod config;
pub mod db;
pub mod export;
pub mod output;
pub mod report;
pub mod review;
pub mod upload;
