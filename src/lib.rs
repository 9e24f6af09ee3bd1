pub mod backend;
pub mod mode;
pub mod settings;
pub mod store;
pub mod types;
pub mod xsettings;
