//! 農業機械の登録カード機能
//!
//! 機械登録の有効期限をもとに、カードの色・強調表示・警告文を
//! 組み立てる。

pub mod card;
