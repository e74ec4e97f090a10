//! # 文件收集器
//!
//! 递归收集来源目录下的待转换文件，并计算镜像目标路径。
//!
//! ## 功能
//! - 递归目录搜索，不跟随符号链接
//! - glob 模式匹配（逗号分隔多模式）
//! - 非常规条目（符号链接、FIFO 等）单独上报，由调用方告警
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `walkdir` 遍历目录
//! - 使用 `glob` 进行模式匹配

use crate::error::{Result, Utf8ifyError};

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 收集结果
#[derive(Debug, Default)]
pub struct CollectedFiles {
    /// 待转换的常规文件，已排序
    pub files: Vec<PathBuf>,
    /// 被跳过的非常规条目
    pub skipped: Vec<PathBuf>,
}

/// 文件收集器
pub struct FileCollector {
    /// 来源目录
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<String>,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: vec!["*".to_string()],
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if self.patterns.is_empty() {
            self.patterns = vec!["*".to_string()];
        }
        self
    }

    /// 递归收集所有匹配的常规文件
    pub fn collect(&self) -> Result<CollectedFiles> {
        let patterns = self
            .patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| {
                    Utf8ifyError::InvalidArgument(format!("Invalid pattern '{}': {}", p, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut collected = CollectedFiles::default();

        for entry in WalkDir::new(&self.input)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }

            if !file_type.is_file() {
                // 符号链接与其他非常规条目不转换，由调用方打印警告
                collected.skipped.push(entry.path().to_path_buf());
                continue;
            }

            if matches_any(&patterns, entry.path()) {
                collected.files.push(entry.path().to_path_buf());
            }
        }

        collected.files.sort();
        Ok(collected)
    }
}

/// 检查文件名是否匹配任一模式
fn matches_any(patterns: &[glob::Pattern], path: &Path) -> bool {
    let filename = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };

    patterns.iter().any(|p| p.matches(filename))
}

/// 计算镜像目标路径：来源文件相对路径重新挂到目标根下
pub fn map_destination(file: &Path, source_root: &Path, destination_root: &Path) -> PathBuf {
    match file.strip_prefix(source_root) {
        Ok(relative) => destination_root.join(relative),
        Err(_) => match file.file_name() {
            Some(name) => destination_root.join(name),
            None => destination_root.to_path_buf(),
        },
    }
}
