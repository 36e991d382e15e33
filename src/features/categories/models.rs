use serde::{Deserialize, Serialize};

/// 取引カテゴリーのデータモデル
///
/// 取引からはIDで参照されるほか、登録時点の名前が取引側に
/// スナップショットとしてコピーされる。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        let category = Category {
            id: "c-1".to_string(),
            name: "種苗費".to_string(),
        };

        let json = serde_json::to_string(&category).unwrap();
        assert!(json.contains("\"name\":\"種苗費\""));

        let deserialized: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, category.id);
        assert_eq!(deserialized.name, category.name);
    }
}
