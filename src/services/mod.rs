pub mod annual_yield;
pub mod orientation;
pub mod solar_algorithm;
pub mod solar_service;
