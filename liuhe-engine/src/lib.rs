pub mod attributes;
pub mod backtest;
pub mod config;
pub mod display;
pub mod evaluate;
pub mod recommend;
pub mod scoring;
pub mod stats;
pub mod strategy;
