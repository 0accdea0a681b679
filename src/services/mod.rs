pub mod counter_service;
