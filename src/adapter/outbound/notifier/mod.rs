//! Notification adapters.
//!
//! Implements the `port::Notifier` trait for various notification backends.

pub mod telegram;

#[cfg(test)]
mod tests;
