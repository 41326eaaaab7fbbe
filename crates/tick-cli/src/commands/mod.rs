pub mod add;
pub mod config;
pub mod delete;
pub mod done;
pub mod edit;
pub mod export;
pub mod import;
pub mod list;
pub mod search;
pub mod snooze;
pub mod sync;
pub mod today;
pub mod view;
