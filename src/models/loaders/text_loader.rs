use crate::models::document::{clean_text, Document};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从已提取的文本文件加载文献
pub async fn load_text_document(text_file_path: &Path) -> Result<Document> {
    let content = fs::read_to_string(text_file_path)
        .await
        .with_context(|| format!("无法读取文本文件: {}", text_file_path.display()))?;

    let filename = text_file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Document::new(filename, clean_text(&content)))
}

/// 从文件夹中加载所有 `.txt` 文献
///
/// 按文件名排序以保证批次顺序确定；隐藏文件（如 `._` 前缀）被跳过，
/// 单个文件读取失败只记录警告。
pub async fn load_all_documents(folder_path: &str) -> Result<Vec<Document>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut text_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_hidden = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name.starts_with('.'));
        let is_text = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_text && !is_hidden {
            text_files.push(path);
        }
    }
    text_files.sort();

    let mut documents = Vec::with_capacity(text_files.len());
    for path in text_files {
        match load_text_document(&path).await {
            Ok(document) => {
                tracing::info!(
                    "已加载: {} ({} 字符)",
                    document.filename,
                    document.raw_text.chars().count()
                );
                documents.push(document);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_all_documents_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_study.txt"), "RESULTS:\n\n  fewer events").unwrap();
        std::fs::write(dir.path().join("a_study.TXT"), "ABSTRACT: \u{201C}x\u{201D}").unwrap();
        std::fs::write(dir.path().join("._a_study.txt"), "junk").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let docs = load_all_documents(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let names: Vec<&str> = docs.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["a_study.TXT", "b_study.txt"]);
        assert_eq!(docs[0].raw_text, "ABSTRACT: \"x\"");
        assert_eq!(docs[1].raw_text, "RESULTS: fewer events");
    }

    #[tokio::test]
    async fn test_load_all_documents_missing_folder() {
        let result = load_all_documents("/definitely/not/here").await;
        tokio_test::assert_err!(result);
    }
}
