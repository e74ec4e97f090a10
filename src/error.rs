//! # 统一错误处理模块
//!
//! 定义 utf8ify 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// utf8ify 统一错误类型
#[derive(Error, Debug)]
pub enum Utf8ifyError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Destination directory does not exist: {path} (use --create-output-dir to create it)")]
    DestinationMissing { path: String },

    // ─────────────────────────────────────────────────────────────
    // 编码错误
    // ─────────────────────────────────────────────────────────────
    #[error("Could not detect encoding of {path}: {reason}")]
    DetectionError { path: String, reason: String },

    #[error("Failed to decode {path} as {encoding}: invalid byte sequence")]
    DecodeError { path: String, encoding: String },

    #[error("Unknown encoding label: {label}")]
    UnknownEncoding { label: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{failed} of {total} file(s) failed to convert")]
    BatchFailed { failed: usize, total: usize },
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, Utf8ifyError>;
