use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FolderStatusQuery<'a> {
    pub folder: &'a str,
}

/// Non-blocking read of the event log, used to seed the cursor.
#[derive(Debug, Serialize)]
pub struct EventsQuery {
    pub since: u64,
    pub limit: u32,
}

/// Long-poll for events after `since`; the daemon holds the request for up to
/// `timeout` seconds when nothing is pending.
#[derive(Debug, Serialize)]
pub struct EventStreamQuery {
    pub since: u64,
    pub timeout: u64,
}
