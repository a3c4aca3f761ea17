pub mod command;
pub mod poem;
pub mod pos;
pub mod settings;
