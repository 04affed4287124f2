//! Hardware-independent core library for the order button
//!
//! This crate contains all platform-agnostic logic of the battery-powered
//! WiFi order button: the network-mode state machine, the captive
//! configuration portal and its HTTP codec, HS256 request signing, persisted
//! credentials, time keeping and the top-level device controller.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32-S3) and desktop hosts (for the simulator and tests).
//! Every piece of hardware is reached through a trait, so the whole
//! controller runs unchanged on either side.

#![no_std]

extern crate alloc;

pub mod button;
pub mod config;
pub mod crypto;
pub mod device;
pub mod http;
pub mod jwt;
pub mod network;
pub mod order;
pub mod portal;
pub mod storage;
pub mod time;

#[cfg(test)]
mod testing;
