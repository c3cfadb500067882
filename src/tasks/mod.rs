pub mod notification_timer;
