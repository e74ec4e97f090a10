//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::Parser;
use std::path::PathBuf;

use crate::models::ConvertConfig;

/// utf8ify - 批量将文本文件重新编码为 UTF-8
#[derive(Parser, Debug)]
#[command(name = "utf8ify")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Re-encode text files to UTF-8 with automatic charset detection", long_about = None)]
pub struct Cli {
    /// Source file or directory
    #[arg(short, long)]
    pub source: PathBuf,

    /// Destination file or directory
    #[arg(short, long)]
    pub destination: PathBuf,

    /// Convert files through a parallel worker pool
    #[arg(short, long, default_value_t = false)]
    pub processes: bool,

    /// Number of parallel workers (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub workers: usize,

    /// Source encoding, bypasses detection (e.g. GBK, Shift_JIS, windows-1252)
    #[arg(short, long)]
    pub encoding: Option<String>,

    /// Bytes sampled from each file for encoding detection
    #[arg(long, alias = "sample_size", default_value_t = 102400, value_parser = parse_sample_size)]
    pub sample_size: usize,

    /// Minimum detection confidence (0.0 - 1.0) to accept a candidate
    #[arg(long, default_value_t = 0.2, value_parser = parse_confidence)]
    pub min_confidence: f32,

    /// Create missing destination directories
    #[arg(long, alias = "create_output_dir", default_value_t = false)]
    pub create_output_dir: bool,

    /// Glob pattern(s) for batch input files, comma separated
    #[arg(long, default_value = "*")]
    pub pattern: String,

    /// Write a per-file CSV report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print each converted file with its resolved encoding
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// 构造不可变转换配置
    pub fn to_config(&self) -> ConvertConfig {
        ConvertConfig {
            encoding: self.encoding.clone(),
            sample_size: self.sample_size,
            min_confidence: self.min_confidence,
            create_output_dir: self.create_output_dir,
            workers: self.workers,
            parallel: self.processes,
        }
    }
}

/// sample_size 校验：必须为正整数
fn parse_sample_size(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value == 0 {
        Err("sample size must be greater than zero".to_string())
    } else {
        Ok(value)
    }
}

/// min_confidence 校验：0.0 - 1.0
fn parse_confidence(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=1.0).contains(&value) {
        Err(format!(
            "min_confidence must be between 0.0 and 1.0, got {}",
            value
        ))
    } else {
        Ok(value)
    }
}
