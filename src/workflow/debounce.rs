//! Debounced, deduplicated free-text input with last-request-wins tickets
//!
//! Every edit takes an [`EditTicket`]. After the quiescence window the holder
//! tries to [`DebouncedInput::settle`]; that only succeeds for the newest edit
//! and only when the value differs from the previously accepted one. A
//! successful settle hands out a [`RequestTicket`]; the result of the work
//! started for it may be applied only while [`DebouncedInput::is_current`]
//! still holds.

/// Monotonic counter; the most recently issued id is the only current one
#[derive(Debug, Default)]
struct Generation {
    current: u64,
}

impl Generation {
    fn next(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    fn is_current(&self, id: u64) -> bool {
        self.current == id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

#[derive(Debug, Default)]
pub struct DebouncedInput {
    edits: Generation,
    requests: Generation,
    last_accepted: Option<String>,
    closed: bool,
}

impl DebouncedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new edit, superseding every earlier one
    pub fn edit(&mut self) -> EditTicket {
        EditTicket(self.edits.next())
    }

    /// Accept `value` if `ticket` is still the newest edit and the value
    /// changed since the last accepted one.
    ///
    /// Accepting supersedes every outstanding request.
    pub fn settle(&mut self, ticket: EditTicket, value: &str) -> Option<RequestTicket> {
        if self.closed || !self.edits.is_current(ticket.0) {
            return None;
        }
        if self.last_accepted.as_deref() == Some(value) {
            return None;
        }
        self.last_accepted = Some(value.to_string());
        Some(RequestTicket(self.requests.next()))
    }

    /// Whether work started for `ticket` may still publish its result
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        !self.closed && self.requests.is_current(ticket.0)
    }

    pub fn last_accepted(&self) -> Option<&str> {
        self.last_accepted.as_deref()
    }

    /// Invalidate every ticket, now and for good
    pub fn close(&mut self) {
        self.closed = true;
        self.edits.next();
        self.requests.next();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
