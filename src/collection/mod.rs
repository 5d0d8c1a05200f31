//! 図鑑（コレクション）ストア
//!
//! 分類済みモンスターの永続化。追加は append のみで、作成後に変更できるのは名前だけ。

mod json_store;

pub use json_store::{JsonCollectionStore, COLLECTION_FILE_NAME};

use crate::error::Result;
use trashmon_common::{CollectionItem, NewCollectionItem};

pub trait CollectionStore {
    /// レコードを追加し、採番したIDを返す。既存レコードは上書きしない
    fn append(&mut self, item: NewCollectionItem) -> Result<u64>;

    /// 撮影日時の新しい順（同時刻はIDの大きい順）
    fn get_all(&self) -> Result<Vec<CollectionItem>>;

    fn get(&self, id: u64) -> Result<Option<CollectionItem>>;

    /// 名前だけを変更する。存在しないIDは `NotFound`
    fn rename(&mut self, id: u64, new_name: &str) -> Result<()>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 全削除（メンテナンス用。ワークフローからは呼ばない）
    fn clear(&mut self) -> Result<()>;
}

/// 図鑑の表示順に並べる
pub(crate) fn sort_for_display(items: &mut [CollectionItem]) {
    items.sort_by(|a, b| b.captured_at.cmp(&a.captured_at).then_with(|| b.id.cmp(&a.id)));
}
