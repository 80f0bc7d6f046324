pub mod analyze;
pub mod event_type;
pub mod keys;
