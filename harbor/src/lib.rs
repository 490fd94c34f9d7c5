pub mod init;
pub mod loader;
pub mod systems;
