use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use tokio::fs;

use crate::store::EntryStore;
use crate::tag::TagSet;
use crate::time_entry::{NewTimeEntry, TimeEntry};

/// `export`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct ExportArgs {
    #[clap(
        short = 'o',
        long = "output",
        help = "Writes to the file instead of stdout",
        parse(from_os_str)
    )]
    pub output: Option<PathBuf>,
}

/// `import`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct ImportArgs {
    #[clap(help = "JSON file written by the export subcommand", parse(from_os_str))]
    pub input: PathBuf,
}

/// タイムエントリーをJSONで書き出し、読み込む。
pub struct TransferCommand<'a, T: EntryStore + ?Sized> {
    store: &'a T,
    tag_set: &'a TagSet,
}

impl<'a, T: EntryStore + ?Sized> TransferCommand<'a, T> {
    /// 新しい`TransferCommand`を返す。
    ///
    /// # Arguments
    ///
    /// * `store` - タイムエントリーの保存先
    /// * `tag_set` - 読み込むファイルのタグを検証するためのタグ集合
    pub fn new(store: &'a T, tag_set: &'a TagSet) -> Self {
        Self { store, tag_set }
    }

    /// 全てのタイムエントリーをJSONの配列として書き出し、件数を返す。
    pub async fn export<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let entries = self
            .store
            .list_entries(None)
            .await
            .context("Failed to retrieve time entries")?;

        serde_json::to_writer_pretty(&mut *writer, &entries)
            .context("Failed to write time entries")?;
        writeln!(writer).context("Failed to write time entries")?;
        info!("Exported {} entries", entries.len());

        Ok(entries.len())
    }

    /// `export`で書き出したファイルを読み込み、全てのエントリーを追加する。
    ///
    /// 識別子はストアで新しく割り当てる。追加した件数を返す。
    /// 登録されていないタグを含む場合は1件も追加せずにエラーとする。
    pub async fn import(&self, input: &Path) -> Result<usize> {
        let contents = fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let entries: Vec<TimeEntry> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", input.display()))?;
        let entries = entries
            .iter()
            .map(|entry| {
                let tag = self
                    .tag_set
                    .parse(entry.tag.name())
                    .with_context(|| format!("Failed to import time entry {}", entry.id))?;
                Ok(NewTimeEntry {
                    tag,
                    ..entry.to_new()
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for entry in &entries {
            self.store
                .add_entry(entry.clone())
                .await
                .context("Failed to import time entry")?;
        }
        info!("Imported {} entries from {}", entries.len(), input.display());

        Ok(entries.len())
    }
}
