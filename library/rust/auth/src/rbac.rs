//! パーミッション判定: 検証済み Claims の `permissions` 配列に対する完全一致チェック。

use crate::claims::Claims;
use crate::error::AuthError;

/// 必要なパーミッションを確認する。
///
/// 大文字小文字を区別する完全一致。ワイルドカードや階層は解釈しない。
/// `permissions` Claim がない、または配列でない場合は `PermissionsMissing`、
/// 配列に含まれない場合は `PermissionDenied` を返す。
pub fn check_permissions(permission: &str, claims: &Claims) -> Result<(), AuthError> {
    let perms = claims.permissions().ok_or(AuthError::PermissionsMissing)?;

    if perms.iter().any(|p| p.as_str() == Some(permission)) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied(permission.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_claims(value: serde_json::Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_check_permissions_granted() {
        let claims = make_claims(json!({"permissions": ["get:drinks-detail", "post:drinks"]}));
        assert!(check_permissions("get:drinks-detail", &claims).is_ok());
        assert!(check_permissions("post:drinks", &claims).is_ok());
    }

    #[test]
    fn test_check_permissions_denied() {
        let claims = make_claims(json!({"permissions": ["get:drinks-detail"]}));
        assert_eq!(
            check_permissions("delete:drinks", &claims),
            Err(AuthError::PermissionDenied("delete:drinks".into()))
        );
    }

    #[test]
    fn test_check_permissions_case_sensitive() {
        let claims = make_claims(json!({"permissions": ["GET:drinks-detail"]}));
        assert!(matches!(
            check_permissions("get:drinks-detail", &claims),
            Err(AuthError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_check_permissions_no_wildcard() {
        let claims = make_claims(json!({"permissions": ["*", "drinks:*"]}));
        assert!(check_permissions("patch:drinks", &claims).is_err());
    }

    #[test]
    fn test_check_permissions_missing_claim() {
        let claims = make_claims(json!({"sub": "user-1"}));
        assert_eq!(
            check_permissions("get:drinks-detail", &claims),
            Err(AuthError::PermissionsMissing)
        );
    }

    #[test]
    fn test_check_permissions_not_an_array() {
        let claims = make_claims(json!({"permissions": "get:drinks-detail"}));
        assert_eq!(
            check_permissions("get:drinks-detail", &claims),
            Err(AuthError::PermissionsMissing)
        );
    }

    #[test]
    fn test_check_permissions_empty_array() {
        let claims = make_claims(json!({"permissions": []}));
        assert!(matches!(
            check_permissions("get:drinks-detail", &claims),
            Err(AuthError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_check_permissions_ignores_non_string_elements() {
        let claims = make_claims(json!({"permissions": [1, null, {"p": "post:drinks"}, "post:drinks"]}));
        assert!(check_permissions("post:drinks", &claims).is_ok());
        assert!(matches!(
            check_permissions("1", &claims),
            Err(AuthError::PermissionDenied(_))
        ));
    }
}
