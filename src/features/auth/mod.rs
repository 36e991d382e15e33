//! 認証機能
//!
//! ベアラートークンの発行・検証を提供する。トークンはユーザーIDを
//! クレーム "Id" として保持し、サインイン時に発行される。

pub mod token;
