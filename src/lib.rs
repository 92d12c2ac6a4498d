//! Laia - command resolution for a voice and text launcher assistant

pub mod command;
pub mod core;
pub mod llm;
pub mod pipeline;
pub mod rules;
pub mod text;
