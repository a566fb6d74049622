use crate::logger::AuditLogger;
use crate::models::AuditLogEntry;

pub struct InMemoryAuditLogger {
    entries: Vec<AuditLogEntry>,
}

impl InMemoryAuditLogger {
    pub fn new() -> Self {
        InMemoryAuditLogger {
            entries: Vec::new(),
        }
    }

    pub fn get_logs(&self) -> Vec<AuditLogEntry> {
        self.entries.clone()
    }
}

impl Default for InMemoryAuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLogger for InMemoryAuditLogger {
    fn log(&mut self, entry: AuditLogEntry) {
        self.entries.push(entry);
    }
}
