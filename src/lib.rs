#![deny(rust_2018_idioms)]
#![deny(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod content;
pub mod markup;
pub mod model;
pub mod nav;
pub mod shell;
pub mod viewer;

pub mod error {
    pub use anyhow::{Error, Result};
}
