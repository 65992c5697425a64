pub mod aggregate;
pub mod chart;
pub mod db;
pub mod entries;
pub mod foods;
pub mod goals;
pub mod models;
pub mod nutritionix;
pub mod service;
