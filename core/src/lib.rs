pub mod convert;
pub mod db;
pub mod error;
pub mod hydration;
pub mod models;
pub mod percent;
pub mod service;
pub mod shape;
