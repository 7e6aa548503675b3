#![cfg_attr(not(test), no_std)]

pub mod adxl362;
pub mod bus;
pub mod color;
pub mod display;
pub mod frame;
pub mod input;
pub mod osd;
pub mod paint;
pub mod ps2_mouse;
pub mod raster;
pub mod sprite;
pub mod ui;
pub mod wiring;

#[cfg(test)]
mod testing;
