//! 커뮤니티 API 핸들러들이 공유하는 사전 정의 스키마

use super::rule::{CustomRule, FieldType, ValidationRule, ValidationSchema};

/// 사용자 프로필 등록/수정 페이로드
pub fn user_profile() -> ValidationSchema {
    ValidationSchema::from([
        (
            "username".to_string(),
            ValidationRule {
                required: true,
                pattern: Some("username".to_string()),
                min_length: Some(3),
                max_length: Some(20),
                ..Default::default()
            },
        ),
        (
            "email".to_string(),
            ValidationRule {
                required: true,
                field_type: Some(FieldType::Email),
                max_length: Some(255),
                ..Default::default()
            },
        ),
        (
            "bio".to_string(),
            ValidationRule {
                max_length: Some(1000),
                ..Default::default()
            },
        ),
        (
            "avatar_url".to_string(),
            ValidationRule {
                field_type: Some(FieldType::Url),
                max_length: Some(500),
                ..Default::default()
            },
        ),
    ])
}

/// 포럼 게시글 작성 페이로드
pub fn forum_post() -> ValidationSchema {
    ValidationSchema::from([
        (
            "title".to_string(),
            ValidationRule {
                required: true,
                min_length: Some(1),
                max_length: Some(200),
                ..Default::default()
            },
        ),
        (
            "content".to_string(),
            ValidationRule {
                required: true,
                min_length: Some(1),
                max_length: Some(10000),
                ..Default::default()
            },
        ),
        (
            "tags".to_string(),
            ValidationRule {
                max_length: Some(500),
                ..Default::default()
            },
        ),
        (
            "category_id".to_string(),
            ValidationRule {
                required: true,
                field_type: Some(FieldType::Uuid),
                ..Default::default()
            },
        ),
    ])
}

/// 댓글 작성 페이로드
pub fn comment() -> ValidationSchema {
    ValidationSchema::from([
        (
            "content".to_string(),
            ValidationRule {
                required: true,
                min_length: Some(1),
                max_length: Some(2000),
                ..Default::default()
            },
        ),
        (
            "parent_id".to_string(),
            ValidationRule {
                field_type: Some(FieldType::Uuid),
                ..Default::default()
            },
        ),
    ])
}

/// 파일 업로드 메타데이터 페이로드
pub fn file_upload() -> ValidationSchema {
    ValidationSchema::from([
        (
            "filename".to_string(),
            ValidationRule {
                required: true,
                max_length: Some(255),
                ..Default::default()
            },
        ),
        (
            "file_type".to_string(),
            ValidationRule {
                required: true,
                max_length: Some(100),
                ..Default::default()
            },
        ),
        (
            "file_size".to_string(),
            ValidationRule {
                required: true,
                custom: Some(CustomRule::ValidatePositiveNumber),
                ..Default::default()
            },
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate, ValidationOptions};
    use serde_json::json;

    #[test]
    fn test_forum_post_schema_rejects_bad_category_only() {
        let data = json!({
            "title": "Hi",
            "content": "Body",
            "category_id": "not-a-uuid"
        });

        let result = validate(
            data.as_object().unwrap(),
            &forum_post(),
            &ValidationOptions::default(),
        );
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors.contains_key("category_id"));
        // 통과한 필드는 정화되어 출력에 포함됨
        assert_eq!(result.sanitized_data.get("title"), Some(&json!("Hi")));
        assert_eq!(result.sanitized_data.get("content"), Some(&json!("Body")));
    }

    #[test]
    fn test_user_profile_schema_accepts_minimal_profile() {
        let data = json!({
            "username": "Herobrine",
            "email": "herobrine@example.com"
        });

        let result = validate(
            data.as_object().unwrap(),
            &user_profile(),
            &ValidationOptions::default(),
        );
        assert!(result.is_valid, "errors: {:?}", result.errors);
    }

    #[test]
    fn test_file_upload_schema_requires_positive_size() {
        let data = json!({
            "filename": "castle-schematic.nbt",
            "file_type": "application/octet-stream",
            "file_size": -20
        });

        let result = validate(
            data.as_object().unwrap(),
            &file_upload(),
            &ValidationOptions::default(),
        );
        assert!(!result.is_valid);
        assert!(result.errors["file_size"][0].contains("positive"));
    }
}
