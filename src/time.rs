//! A port that provides the **current instant** for the application.
//!
//! # Purpose
//!
//! This trait abstracts access to "now" so that:
//!
//! - [`crate::auth::AuthManager`]'s expiry-boundary logic does not depend
//!   on system time directly
//! - Tests can deterministically place the clock exactly at, just before,
//!   or just after a token's expiry boundary
//!
//! Mirrors the `Clock`/`SystemClock` split used elsewhere for calendar
//! dates, generalized here to instants.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// A [`Clock`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
