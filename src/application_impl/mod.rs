mod cuenta_service_impl;

pub use cuenta_service_impl::*;
