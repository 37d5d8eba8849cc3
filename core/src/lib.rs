pub mod db;
pub mod models;
pub mod service;
pub mod timeline;
pub mod week;
