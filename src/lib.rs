//! ゴミモンスター捕獲・分別図鑑
//!
//! 撮影 → 分類 → 命名 → 図鑑保存 のワークフローと、その周辺（カメラ・分類クライアント・図鑑ストア・設定）。

pub mod capture;
pub mod classifier;
pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod session;
pub mod workflow;
