//! coffeeshop-drinks-server: ドリンクメニューの REST サービス。
//!
//! 一覧取得は公開、詳細一覧と書き込みは Bearer トークンの `permissions` で保護する。

pub mod adapter;
pub mod domain;
pub mod infrastructure;
pub mod usecase;
