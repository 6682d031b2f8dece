//! Integration and end-to-end tests for Turnstile live under `tests/`.
