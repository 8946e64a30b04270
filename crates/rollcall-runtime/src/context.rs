//! Handler context.

use rollcall_auth::Session;
use rollcall_store::Database;
use rollcall_types::{RequestId, UserId};

/// What a handler sees of the request besides its input.
///
/// Built by the dispatcher after authorization succeeded. The session is
/// read-only; handlers cannot change who they run as.
#[derive(Debug, Clone)]
pub struct ProcedureContext {
    request_id: RequestId,
    session: Option<Session>,
    db: Database,
}

impl ProcedureContext {
    /// Creates a context.
    #[must_use]
    pub fn new(request_id: RequestId, session: Option<Session>, db: Database) -> Self {
        Self {
            request_id,
            session,
            db,
        }
    }

    /// Correlation id of this invocation.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// The caller's session. `None` only for public procedures.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The caller's identity, if authenticated.
    #[must_use]
    pub fn user(&self) -> Option<&UserId> {
        self.session.as_ref().map(Session::user)
    }

    /// Repositories.
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.db
    }
}
