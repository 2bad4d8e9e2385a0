use crate::api::{BackendClient, Session};
use crate::error::ApiError;

/// Why a session was requested; decides how the result is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRequest {
    /// First load: join the shared demo session.
    Join,
    /// First load with a brand-new session instead of the shared one.
    Fresh,
    /// Clear chat: supersede `previous` with a brand-new session.
    Replace { previous: String },
}

/// Shared demo session for the stored language pair.
pub async fn join_demo(client: &BackendClient) -> Result<Session, ApiError> {
    let languages = client.preferences().languages();
    client.demo_session(&languages).await
}

/// Brand-new session for the stored language pair.
pub async fn start_new(client: &BackendClient) -> Result<Session, ApiError> {
    let languages = client.preferences().languages();
    client.create_session(&languages).await
}

pub async fn resolve(client: &BackendClient, request: &SessionRequest) -> Result<Session, ApiError> {
    match request {
        SessionRequest::Join => join_demo(client).await,
        SessionRequest::Fresh | SessionRequest::Replace { .. } => start_new(client).await,
    }
}

/// Make `session` the identity attached to every later request.
pub fn register(client: &BackendClient, session: &Session) {
    tracing::info!(
        session_id = %session.id,
        doctor_lang = %session.doctor_lang,
        patient_lang = %session.patient_lang,
        "session active"
    );
    client.set_session_id(&session.id);
}
