use serde::{Deserialize, Serialize};

/// 農地境界のGPS座標点
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// 収穫記録
///
/// 農地に埋め込まれて保存される。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Harvest {
    pub id: String,
    pub culture_name: String,
    pub amount: f64,
    pub date: String,
}

/// 農地のデータモデル
///
/// 境界点と収穫記録は農地レコードに埋め込んで保持する。
/// 所有者IDはレスポンスには含めない。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Plot {
    pub id: String,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    /// 面積（平方メートル）
    pub area: i64,
    pub plot_number: i64,
    pub municipality: String,
    pub border_points: Vec<GeoPoint>,
    pub current_culture: String,
    pub harvests: Vec<Harvest>,
    pub created_at: String,
}

/// 農地登録リクエスト
#[derive(Debug, Deserialize, Clone)]
pub struct CreatePlotDto {
    pub area: i64,
    pub plot_number: i64,
    pub municipality: String,
    pub border_points: Vec<GeoPoint>,
    #[serde(default)]
    pub current_culture: String,
    #[serde(default)]
    pub harvests: Vec<Harvest>,
}
