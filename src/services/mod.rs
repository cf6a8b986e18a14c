pub mod hello_service;
