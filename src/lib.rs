//! report-tui - report widgets for terminal applications
//!
//! A filter toolbar with category dialogs, a paginated listing table, a
//! date-range picker and a CSV export button, built on ratatui. The
//! `model` layer holds the criteria state machine and is usable without a
//! terminal; `components` renders it.

pub mod action;
pub mod app;
pub mod component;
pub mod components;
pub mod config;
pub mod model;
pub mod services;
pub mod tui;
