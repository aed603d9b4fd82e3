//! Error Kind - Classification of errors
//!
//! [`ErrorKind`] decides the HTTP status, the reason phrase and the
//! envelope status (`fail` / `error`) of every error response.

use serde::Serialize;

/// エラー種別
///
/// API が返しうるステータスコードだけを列挙します。
/// 4xx は `fail`、5xx は `error` としてクライアントに返されます。
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::NotFound;
/// assert_eq!(kind.status_code(), 404);
/// assert_eq!(kind.envelope_status(), "fail");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - 不正な ID、キャストできない値、壊れた JSON
    BadRequest,
    /// 401 - 未ログイン、トークン不正、認証情報の誤り
    Unauthorized,
    /// 403 - ロール不足
    Forbidden,
    /// 404 - リソースまたはルートが存在しない
    NotFound,
    /// 405 - パスはあるがメソッドがない
    MethodNotAllowed,
    /// 409 - 一意制約違反
    Conflict,
    /// 413 - ボディサイズ上限超過
    PayloadTooLarge,
    /// 422 - 入力データの検証失敗
    UnprocessableEntity,
    /// 429 - リクエスト過多
    TooManyRequests,
    /// 500 - 想定外のエラー
    InternalServerError,
    /// 503 - DB プール枯渇、メール送信失敗
    ServiceUnavailable,
}

const ALL: [ErrorKind; 11] = [
    ErrorKind::BadRequest,
    ErrorKind::Unauthorized,
    ErrorKind::Forbidden,
    ErrorKind::NotFound,
    ErrorKind::MethodNotAllowed,
    ErrorKind::Conflict,
    ErrorKind::PayloadTooLarge,
    ErrorKind::UnprocessableEntity,
    ErrorKind::TooManyRequests,
    ErrorKind::InternalServerError,
    ErrorKind::ServiceUnavailable,
];

impl ErrorKind {
    /// `(status, reason phrase)`
    const fn parts(&self) -> (u16, &'static str) {
        match self {
            ErrorKind::BadRequest => (400, "Bad Request"),
            ErrorKind::Unauthorized => (401, "Unauthorized"),
            ErrorKind::Forbidden => (403, "Forbidden"),
            ErrorKind::NotFound => (404, "Not Found"),
            ErrorKind::MethodNotAllowed => (405, "Method Not Allowed"),
            ErrorKind::Conflict => (409, "Conflict"),
            ErrorKind::PayloadTooLarge => (413, "Payload Too Large"),
            ErrorKind::UnprocessableEntity => (422, "Unprocessable Entity"),
            ErrorKind::TooManyRequests => (429, "Too Many Requests"),
            ErrorKind::InternalServerError => (500, "Internal Server Error"),
            ErrorKind::ServiceUnavailable => (503, "Service Unavailable"),
        }
    }

    /// HTTP ステータスコード
    #[inline]
    pub const fn status_code(&self) -> u16 {
        self.parts().0
    }

    /// 標準の理由フレーズ
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.parts().1
    }

    /// Kind of a status produced outside the handlers (router, body limit).
    /// Unknown 4xx fall back to `BadRequest`, unknown 5xx to
    /// `InternalServerError`; anything else is not an error.
    pub fn from_status(status: u16) -> Option<Self> {
        if let Some(kind) = ALL.into_iter().find(|kind| kind.status_code() == status) {
            return Some(kind);
        }
        match status {
            400..=499 => Some(ErrorKind::BadRequest),
            500..=599 => Some(ErrorKind::InternalServerError),
            _ => None,
        }
    }

    /// Envelope status: `fail` for 4xx, `error` for everything else.
    #[inline]
    pub const fn envelope_status(&self) -> &'static str {
        if self.is_client_error() { "fail" } else { "error" }
    }

    /// 5xx はログに残す
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    #[inline]
    pub const fn is_client_error(&self) -> bool {
        matches!(self.status_code(), 400..=499)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
