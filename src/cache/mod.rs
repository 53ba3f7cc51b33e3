//! Cache of parsed root configs, one per module.
//!
//! Where sources come from and how long to wait for them is left to a
//! [`cache::SourceProvider`] and an explicit [`cache::WaitPolicy`].

pub mod cache;

#[cfg(test)]
mod tests;
