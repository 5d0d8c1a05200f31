//! JSONファイルによる図鑑ストア
//!
//! データディレクトリの `collection.json` に全件を保持する。
//! 書き込みは一時ファイルへ書いてから rename する。

use super::{sort_for_display, CollectionStore};
use crate::error::{Result, TrashmonError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use trashmon_common::{validate_monster_name, CollectionItem, NewCollectionItem};

pub const COLLECTION_FILE_NAME: &str = "collection.json";

/// ファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionFile {
    /// バージョン（互換性チェック用）
    version: u32,
    next_id: u64,
    items: Vec<CollectionItem>,
}

impl CollectionFile {
    const CURRENT_VERSION: u32 = 1;
}

impl Default for CollectionFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            next_id: 1,
            items: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct JsonCollectionStore {
    path: PathBuf,
    data: CollectionFile,
}

impl JsonCollectionStore {
    /// データディレクトリのストアを開く。ファイルが無ければ空
    ///
    /// 壊れたファイルやバージョン違いは作り直さずエラーにする。
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(COLLECTION_FILE_NAME);
        if !path.exists() {
            debug!(path = %path.display(), "collection file not found, starting empty");
            return Ok(Self {
                path,
                data: CollectionFile::default(),
            });
        }

        let reader = BufReader::new(File::open(&path)?);
        let data: CollectionFile = serde_json::from_reader(reader)
            .map_err(|e| TrashmonError::StoreCorrupted(format!("{}: {}", path.display(), e)))?;

        if data.version != CollectionFile::CURRENT_VERSION {
            return Err(TrashmonError::StoreCorrupted(format!(
                "지원하지 않는 버전이에요: {}",
                data.version
            )));
        }

        info!(path = %path.display(), items = data.items.len(), "collection loaded");
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &CollectionFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, data)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// 変更後のデータを書き込めた場合だけメモリ上の状態を差し替える
    fn commit(&mut self, next: CollectionFile) -> Result<()> {
        self.persist(&next)
            .map_err(|e| TrashmonError::Persistence(e.to_string()))?;
        self.data = next;
        Ok(())
    }
}

impl CollectionStore for JsonCollectionStore {
    fn append(&mut self, item: NewCollectionItem) -> Result<u64> {
        let id = self.data.next_id;
        let mut next = self.data.clone();
        next.items.push(item.with_id(id));
        next.next_id = id + 1;
        self.commit(next)?;

        info!(id, "collection item appended");
        Ok(id)
    }

    fn get_all(&self) -> Result<Vec<CollectionItem>> {
        let mut items = self.data.items.clone();
        sort_for_display(&mut items);
        Ok(items)
    }

    fn get(&self, id: u64) -> Result<Option<CollectionItem>> {
        Ok(self.data.items.iter().find(|i| i.id == id).cloned())
    }

    fn rename(&mut self, id: u64, new_name: &str) -> Result<()> {
        let name = validate_monster_name(new_name)?;
        let mut next = self.data.clone();
        let item = next
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(TrashmonError::NotFound(id))?;
        item.monster_name = name;
        self.commit(next)?;

        info!(id, "collection item renamed");
        Ok(())
    }

    fn len(&self) -> usize {
        self.data.items.len()
    }

    fn clear(&mut self) -> Result<()> {
        // IDは再利用しない
        let next = CollectionFile {
            next_id: self.data.next_id,
            ..Default::default()
        };
        self.commit(next)?;
        info!("collection cleared");
        Ok(())
    }
}
