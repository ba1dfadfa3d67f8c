pub mod client_tracker;
