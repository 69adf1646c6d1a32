//! Terminal front end for the tree grid pages.

#![allow(missing_docs)]
#![allow(clippy::needless_pass_by_value)]

pub mod cli;
pub mod commands;
pub mod logging;
pub mod pages;
pub mod render;
pub mod routes;
pub mod settings;
