//! Desktop client for a Hack or Snooze story board: browse stories, log in,
//! submit and delete your own stories, and keep a list of favorites.

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pages;
pub mod session;
pub mod stories;
