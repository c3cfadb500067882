pub mod notification_service;
pub mod reschedule_service;
pub mod schedule_service;
