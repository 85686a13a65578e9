// ABOUTME: Diagnostics accumulator for non-fatal warnings during a request.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be reported.

/// Collects non-fatal warnings during adapter operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a request.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Registry declared without a username.
    pub fn registry_login_skipped(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::RegistryLoginSkipped,
            message: message.into(),
        }
    }

    /// Project network still had endpoints during teardown.
    pub fn network_in_use(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::NetworkInUse,
            message: message.into(),
        }
    }

    /// A single service failed while the rest of the project deployed.
    pub fn service_failed(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ServiceFailed,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur while serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Registry credentials were incomplete, so no login happened.
    RegistryLoginSkipped,
    /// A project network could not be removed because it is still in use.
    NetworkInUse,
    /// One service of a project could not be created or started.
    ServiceFailed,
}
