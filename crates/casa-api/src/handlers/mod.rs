//! Request handlers

pub mod smarthome;
