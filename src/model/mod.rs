pub mod checkin;
pub mod client;
pub mod employee;
pub mod role;
