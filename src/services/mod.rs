// Service module exports

pub mod clash;
pub mod event;
pub mod selection;
pub mod session;
pub mod storage;
