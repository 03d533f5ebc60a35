use crate::validation::StudentId;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in student plus the moment they signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub student_id: StudentId,
    pub last_login: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(student_id: StudentId, last_login: DateTime<Utc>) -> Self {
        Self {
            student_id,
            last_login,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    #[serde(flatten)]
    pub record: SessionRecord,
    /// Milliseconds since the Unix epoch.
    pub expires: i64,
}

impl TokenClaims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.expires
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("token payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

pub fn encode_token(record: &SessionRecord, expires_at: DateTime<Utc>) -> Result<String, serde_json::Error> {
    let claims = TokenClaims {
        record: record.clone(),
        expires: expires_at.timestamp_millis(),
    };
    Ok(STANDARD.encode(serde_json::to_vec(&claims)?))
}

pub fn decode_token(token: &str) -> Result<TokenClaims, TokenError> {
    let bytes = STANDARD.decode(token.trim())?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(SessionRecord),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Why a stored session that claims to be signed in cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    MissingToken,
    MalformedToken,
    Expired,
    MissingPayload,
    MalformedPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredSession {
    Valid(SessionState),
    Stale(StaleReason),
}

/// Derives the session from the three stored values.
pub fn classify(
    flag: Option<&str>,
    token: Option<&str>,
    payload: Option<&str>,
    now: DateTime<Utc>,
) -> StoredSession {
    if flag != Some("true") {
        return StoredSession::Valid(SessionState::Anonymous);
    }

    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return StoredSession::Stale(StaleReason::MissingToken);
    };
    let claims = match decode_token(token) {
        Ok(claims) => claims,
        Err(_) => return StoredSession::Stale(StaleReason::MalformedToken),
    };
    if claims.is_expired_at(now) {
        return StoredSession::Stale(StaleReason::Expired);
    }

    let Some(payload) = payload else {
        return StoredSession::Stale(StaleReason::MissingPayload);
    };
    match serde_json::from_str::<SessionRecord>(payload) {
        Ok(record) if record.student_id == claims.record.student_id => {
            StoredSession::Valid(SessionState::Authenticated(record))
        }
        _ => StoredSession::Stale(StaleReason::MalformedPayload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record() -> SessionRecord {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        SessionRecord::new(StudentId::parse("403472").unwrap(), at)
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let json = serde_json::to_string(&record()).unwrap();
        assert!(json.contains("\"studentId\":\"403472\""));
        assert!(json.contains("\"lastLogin\":\"2026-03-02T09:30:00Z\""));
    }

    #[test]
    fn token_carries_record_and_expiry() {
        let record = record();
        let expires = record.last_login + Duration::hours(24);
        let token = encode_token(&record, expires).unwrap();
        assert!(!token.contains('{'));

        let claims = decode_token(&token).unwrap();
        assert_eq!(claims.record, record);
        assert_eq!(claims.expires, expires.timestamp_millis());
        assert!(!claims.is_expired_at(expires - Duration::seconds(1)));
        assert!(claims.is_expired_at(expires));
    }

    #[test]
    fn classify_without_flag_is_anonymous() {
        let now = Utc::now();
        assert_eq!(
            classify(None, Some("junk"), Some("junk"), now),
            StoredSession::Valid(SessionState::Anonymous)
        );
        assert_eq!(
            classify(Some("false"), None, None, now),
            StoredSession::Valid(SessionState::Anonymous)
        );
    }

    #[test]
    fn classify_detects_stale_sessions() {
        let record = record();
        let now = record.last_login + Duration::hours(1);
        let token = encode_token(&record, record.last_login + Duration::hours(24)).unwrap();
        let payload = serde_json::to_string(&record).unwrap();

        assert_eq!(
            classify(Some("true"), Some(&token), Some(&payload), now),
            StoredSession::Valid(SessionState::Authenticated(record.clone()))
        );
        assert_eq!(
            classify(Some("true"), None, Some(&payload), now),
            StoredSession::Stale(StaleReason::MissingToken)
        );
        assert_eq!(
            classify(Some("true"), Some("%%%"), Some(&payload), now),
            StoredSession::Stale(StaleReason::MalformedToken)
        );
        assert_eq!(
            classify(Some("true"), Some(&token), None, now),
            StoredSession::Stale(StaleReason::MissingPayload)
        );
        assert_eq!(
            classify(Some("true"), Some(&token), Some("{}"), now),
            StoredSession::Stale(StaleReason::MalformedPayload)
        );
        assert_eq!(
            classify(Some("true"), Some(&token), Some(&payload), now + Duration::days(2)),
            StoredSession::Stale(StaleReason::Expired)
        );
    }

    #[test]
    fn classify_rejects_payload_for_another_student() {
        let record = record();
        let now = record.last_login + Duration::hours(1);
        let token = encode_token(&record, record.last_login + Duration::hours(24)).unwrap();
        let other = SessionRecord::new(StudentId::parse("123456").unwrap(), record.last_login);
        let payload = serde_json::to_string(&other).unwrap();

        assert_eq!(
            classify(Some("true"), Some(&token), Some(&payload), now),
            StoredSession::Stale(StaleReason::MalformedPayload)
        );
    }
}
