use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 農業機械の登録情報
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Machinery {
    pub machine_type: String,
    pub model: String,
    /// 登録の有効期限日
    pub registered_until: NaiveDate,
}

/// 登録の有効性ステータス
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "status")]
pub enum RegistrationStatus {
    /// 期限切れ
    Expired,
    /// 失効間近（30日未満）
    ExpiringSoon { days_left: i64 },
    /// 有効
    Valid { days_left: i64 },
}

/// 登録カードの表示情報
///
/// 期限の残り日数に応じて色・強調・警告文を決める。
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RegistrationCard {
    pub machine_type: String,
    pub model: String,
    pub registered_until: NaiveDate,
    pub status: RegistrationStatus,
    /// カードの表示色
    pub color: String,
    /// 期限の強調表示
    pub highlight: bool,
    /// 警告文（期限まで90日以上ある場合はNone）
    pub banner: Option<String>,
}

/// 機械の登録カードを組み立てる
///
/// # 引数
/// * `machinery` - 機械の登録情報
/// * `today` - 判定基準日
///
/// # 戻り値
/// 表示情報を含む登録カード
pub fn registration_card(machinery: &Machinery, today: NaiveDate) -> RegistrationCard {
    let days_left = (machinery.registered_until - today).num_days();

    // 強調枠は期限切れの場合のみ表示する
    let (status, color, highlight, banner) = if days_left < 0 {
        (
            RegistrationStatus::Expired,
            "#A63232".to_string(),
            true,
            Some("登録期限切れ".to_string()),
        )
    } else if days_left < 30 {
        (
            RegistrationStatus::ExpiringSoon { days_left },
            "orange".to_string(),
            false,
            Some(format!("登録失効まで{days_left}日")),
        )
    } else {
        let banner = if days_left < 90 {
            Some(format!("登録失効まで{days_left}日"))
        } else {
            None
        };
        (
            RegistrationStatus::Valid { days_left },
            "blue".to_string(),
            false,
            banner,
        )
    };

    RegistrationCard {
        machine_type: machinery.machine_type.clone(),
        model: machinery.model.clone(),
        registered_until: machinery.registered_until,
        status,
        color,
        highlight,
        banner,
    }
}
