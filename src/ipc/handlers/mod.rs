pub mod attendance;
pub mod auth_admin;
pub mod classes;
pub mod core;
pub mod docstore;
pub mod grades;
pub mod sections;
pub mod settings;
pub mod staff;
pub mod students;
pub mod users;
