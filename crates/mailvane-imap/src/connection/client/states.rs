//! Type-state markers for the client connection.

/// Initial state after the greeting, before LOGIN.
#[derive(Debug)]
pub struct NotAuthenticated;

/// State after a successful LOGIN.
#[derive(Debug)]
pub struct Authenticated;

/// State after a successful SELECT.
#[derive(Debug)]
pub struct Selected;
