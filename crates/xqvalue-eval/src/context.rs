//! Dynamic evaluation context

use chrono::{Local, Offset};
use serde::{Deserialize, Serialize};
use xqvalue_types::Timezone;

/// Per-query evaluation state consumed by the value layer
///
/// Only the implicit timezone is needed: it stands in for the timezone of
/// date and time operands that carry none when they are subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicContext {
    implicit_timezone: Timezone,
}

impl Default for DynamicContext {
    fn default() -> Self {
        Self::utc()
    }
}

impl DynamicContext {
    /// Context whose implicit timezone is UTC
    pub fn utc() -> Self {
        Self {
            implicit_timezone: Timezone::UTC,
        }
    }

    /// Context using the host's current local offset
    ///
    /// Falls back to UTC when the host offset is outside the range a
    /// timezone may take.
    pub fn from_system() -> Self {
        let seconds = Local::now().offset().fix().local_minus_utc();
        let implicit_timezone = Timezone::from_offset_minutes(seconds / 60).unwrap_or(Timezone::UTC);
        log::debug!("implicit timezone from host: {} minutes", implicit_timezone.offset_minutes());
        Self { implicit_timezone }
    }

    pub fn builder() -> DynamicContextBuilder {
        DynamicContextBuilder::default()
    }

    pub fn implicit_timezone(&self) -> Timezone {
        self.implicit_timezone
    }
}

/// Builder for [`DynamicContext`]
#[derive(Debug, Clone, Default)]
pub struct DynamicContextBuilder {
    implicit_timezone: Option<Timezone>,
}

impl DynamicContextBuilder {
    /// Set the implicit timezone
    pub fn implicit_timezone(mut self, timezone: Timezone) -> Self {
        self.implicit_timezone = Some(timezone);
        self
    }

    pub fn build(self) -> DynamicContext {
        DynamicContext {
            implicit_timezone: self.implicit_timezone.unwrap_or(Timezone::UTC),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_utc() {
        assert_eq!(DynamicContext::builder().build(), DynamicContext::utc());
        assert_eq!(DynamicContext::default().implicit_timezone(), Timezone::UTC);
    }

    #[test]
    fn test_system_offset_is_a_valid_timezone() {
        let offset = DynamicContext::from_system().implicit_timezone().offset_minutes();
        assert!((-14 * 60..=14 * 60).contains(&offset));
    }

    #[test]
    fn test_serde_round_trip() {
        let ctx = DynamicContext::builder()
            .implicit_timezone(Timezone::new(-3, -30).unwrap())
            .build();
        let json = serde_json::to_string(&ctx).unwrap();
        assert_eq!(serde_json::from_str::<DynamicContext>(&json).unwrap(), ctx);
    }
}
