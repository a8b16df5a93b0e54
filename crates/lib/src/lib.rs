//! gemline core library — LINE webhook verification and dispatch, Gemini and LINE
//! clients, and the gateway used by the CLI.

pub mod channels;
pub mod config;
pub mod gateway;
pub mod llm;
pub mod webhook;
