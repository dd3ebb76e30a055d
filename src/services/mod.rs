// Service module exports

pub mod api;
pub mod database;
pub mod schedule;
pub mod session;
pub mod storage;
