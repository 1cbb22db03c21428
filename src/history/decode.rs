// ABOUTME: Tolerant decoding of event payloads for read projections.
// ABOUTME: A payload that is missing or malformed degrades to its default value.

use std::fmt::Display;

use crate::types::EventId;

/// Take the decoded value, or `T::default()` if decoding failed.
///
/// History must stay readable when older events carry payloads of another
/// shape, so the failure is only logged at debug level.
pub fn best_effort<T, E>(event: &EventId, decoded: Result<T, E>) -> T
where
    T: Default,
    E: Display,
{
    decoded.unwrap_or_else(|e| {
        tracing::debug!("event {}: using empty payload: {}", event, e);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_decoded_value() {
        let id = EventId::generate();
        let value: String = best_effort(&id, Ok::<_, String>("abc".to_string()));
        assert_eq!(value, "abc");
    }

    #[test]
    fn falls_back_to_default() {
        let id = EventId::generate();
        let value: Vec<u8> = best_effort(&id, Err("malformed"));
        assert!(value.is_empty());
    }
}
