//! Structured connection logging.
//!
//! Gives every WebSocket connection the same set of fields so a
//! subject's lifecycle can be followed in the logs.

use tracing::{debug, info, warn, Span};

use smartsession_models::{ConnectionId, Status};

/// Which side of the monitor a connection is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRole {
    /// Subject streaming frames in
    Student,
    /// Observer receiving status updates
    Teacher,
}

impl ConnectionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionRole::Student => "student",
            ConnectionRole::Teacher => "teacher",
        }
    }
}

impl std::fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection logger with consistent contextual fields.
#[derive(Debug, Clone)]
pub struct ConnectionLogger {
    connection_id: String,
    role: ConnectionRole,
}

impl ConnectionLogger {
    pub fn new(connection_id: &ConnectionId, role: ConnectionRole) -> Self {
        Self {
            connection_id: connection_id.to_string(),
            role,
        }
    }

    pub fn log_open(&self) {
        info!(
            connection_id = %self.connection_id,
            role = %self.role,
            "Connection opened"
        );
    }

    pub fn log_close(&self) {
        info!(
            connection_id = %self.connection_id,
            role = %self.role,
            "Connection closed"
        );
    }

    /// A frame was dropped without affecting the session.
    pub fn log_skipped(&self, reason: &str, detail: &str) {
        debug!(
            connection_id = %self.connection_id,
            role = %self.role,
            reason,
            "Frame skipped: {}", detail
        );
    }

    pub fn log_transition(&self, from: Status, to: Status, face_count: u32) {
        info!(
            connection_id = %self.connection_id,
            role = %self.role,
            from = %from,
            to = %to,
            face_count,
            "Status changed"
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            connection_id = %self.connection_id,
            role = %self.role,
            "Connection warning: {}", message
        );
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn role(&self) -> ConnectionRole {
        self.role
    }

    /// Span covering the whole connection.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "ws_connection",
            connection_id = %self.connection_id,
            role = %self.role
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_logger_fields() {
        let id = ConnectionId::from_string("conn-1");
        let logger = ConnectionLogger::new(&id, ConnectionRole::Teacher);
        assert_eq!(logger.connection_id(), "conn-1");
        assert_eq!(logger.role(), ConnectionRole::Teacher);
        assert_eq!(logger.role().to_string(), "teacher");
    }
}
