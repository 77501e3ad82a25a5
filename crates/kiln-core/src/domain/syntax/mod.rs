//! Textual side of the model: rendering artifacts and config trees to
//! source, and reading them back.

pub mod class_reader;
pub mod class_writer;
pub mod config_reader;
pub mod config_writer;
mod lexer;

pub use class_reader::read_class;
pub use class_writer::{render_class, render_file};
pub use config_reader::read_config;
pub use config_writer::{render_config_file, render_config_literal, render_config_source};
