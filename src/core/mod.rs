//! Core editor module
//!
//! This module contains:
//! - The editor and its single editing session
//! - Host command dispatch and export

pub mod editor;
