#![allow(dead_code)]

pub mod architecture;
pub mod chain;
pub mod config;
pub mod fixtures;
