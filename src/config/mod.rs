pub mod accounts;
pub mod credentials;
pub mod descriptor;
pub mod error;
pub mod proc_loader;
pub mod proc_validator;
pub mod registry;
pub mod settings;
