mod cuenta_service;

pub use cuenta_service::*;
