//! Core application logic: state, events, key and reply handling, action dispatch.

pub mod action;
pub mod event;
pub mod handler;
pub mod state;
