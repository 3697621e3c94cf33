//! Network services built on the embassy-net stack
pub mod httpd;
pub mod ntp;
pub mod scan;
