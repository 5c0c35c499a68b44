//! Shortcode Locator - find what shortcodes are used and where
//!
//! This library provides the shortcode matcher, the listing coordinator and
//! the display settings behind the locator's admin pages and JSON API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod plugin;
pub mod services;
