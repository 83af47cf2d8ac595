//! 検証済み JWT Claims。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims は署名・メタデータ検証を通過したトークンのペイロードを表す。
///
/// キーは文字列、値は任意の JSON。1 リクエストの間だけ存在し、永続化しない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// sub Claim を返す。
    pub fn subject(&self) -> Option<&str> {
        self.0.get("sub").and_then(Value::as_str)
    }

    /// `permissions` Claim が配列の場合のみその要素を返す。
    pub fn permissions(&self) -> Option<&[Value]> {
        self.0
            .get("permissions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }
}

impl std::fmt::Display for Claims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Claims{{sub={:?}, permissions={}}}",
            self.subject(),
            self.permissions().map_or(0, <[Value]>::len),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_permissions_array() {
        let c = claims(json!({"sub": "auth0|barista", "permissions": ["get:drinks-detail"]}));
        assert_eq!(c.subject(), Some("auth0|barista"));
        assert_eq!(c.permissions().unwrap(), &[json!("get:drinks-detail")]);
    }

    #[test]
    fn test_permissions_not_array() {
        let c = claims(json!({"permissions": "get:drinks-detail"}));
        assert!(c.permissions().is_none());
    }

    #[test]
    fn test_permissions_absent() {
        let c = claims(json!({"sub": "user"}));
        assert!(c.permissions().is_none());
        assert_eq!(c.subject(), Some("user"));
    }

    #[test]
    fn test_display() {
        let c = claims(json!({"sub": "user-1", "permissions": ["a", "b"]}));
        let s = format!("{}", c);
        assert!(s.contains("user-1"));
        assert!(s.contains("permissions=2"));
    }
}
