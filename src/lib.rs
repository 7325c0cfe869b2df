#![no_std]

extern crate alloc;

pub mod app_state;
pub mod config;
pub mod display_manager;
pub mod module_manager;
pub mod remote;
pub mod sensors;
pub mod storage;
pub mod time_manager;
pub mod timing;
pub mod ui;
pub mod windows;

#[cfg(test)]
mod testing;
