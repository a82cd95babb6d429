#![warn(missing_docs)]

#[macro_use]
pub mod logging;

#[cfg(test)]
pub mod drop;
pub mod error;
#[cfg(test)]
pub mod hash;
pub mod option;
pub mod panic;
pub mod result;
