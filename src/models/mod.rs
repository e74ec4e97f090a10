//! # 数据模型模块
//!
//! 定义转换请求、转换结果与运行配置的数据模型。
//!
//! ## 依赖关系
//! - 被 `detector.rs`, `converter.rs`, `batch/`, `commands/` 使用
//! - 使用 `error.rs` 的错误类型

use std::path::PathBuf;

use crate::error::Utf8ifyError;

/// 转换运行配置
///
/// 不可变，由 CLI 层构造一次，之后只读共享。
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// 显式来源编码（None 时按文件自动检测）
    pub encoding: Option<String>,
    /// 编码检测采样字节数
    pub sample_size: usize,
    /// 检测置信度下限，低于该值视为检测失败
    pub min_confidence: f32,
    /// 是否自动创建缺失的目标目录
    pub create_output_dir: bool,
    /// 并行工作线程数（0 = 自动）
    pub workers: usize,
    /// 是否启用并行工作池
    pub parallel: bool,
}

/// 单文件转换请求
///
/// 构造后不可变，每个文件对应一个实例。
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// 来源文件路径
    pub source: PathBuf,
    /// 目标文件路径
    pub destination: PathBuf,
    /// 显式来源编码
    pub encoding: Option<String>,
    /// 编码检测采样字节数
    pub sample_size: usize,
}

impl ConversionRequest {
    /// 从配置构造单文件转换请求
    pub fn new(source: PathBuf, destination: PathBuf, config: &ConvertConfig) -> Self {
        Self {
            source,
            destination,
            encoding: config.encoding.clone(),
            sample_size: config.sample_size,
        }
    }
}

/// 解析得到的编码
#[derive(Debug, Clone)]
pub struct ResolvedEncoding {
    /// 编码名称（检测器或调用者给出的标签）
    pub name: String,
    /// 置信度，显式指定时为 1.0
    pub confidence: f32,
}

impl ResolvedEncoding {
    /// 显式指定的编码
    pub fn explicit(name: &str) -> Self {
        Self {
            name: name.to_string(),
            confidence: 1.0,
        }
    }

    /// 检测得到的编码
    pub fn detected(name: String, confidence: f32) -> Self {
        Self { name, confidence }
    }
}

/// 单文件转换状态
#[derive(Debug)]
pub enum ConversionStatus {
    /// 转换成功
    Success,
    /// 跳过（原因）
    Skipped(String),
    /// 转换失败
    Failed(Utf8ifyError),
}

/// 单文件转换结果
///
/// 创建后不可变；始终携带来源请求的路径，便于调用方重排序。
#[derive(Debug)]
pub struct ConversionResult {
    /// 来源文件路径
    pub source: PathBuf,
    /// 目标文件路径
    pub destination: PathBuf,
    /// 实际使用的编码（失败且未解析时为 None）
    pub resolved_encoding: Option<ResolvedEncoding>,
    /// 转换状态
    pub status: ConversionStatus,
}

impl ConversionResult {
    /// 成功结果
    pub fn success(request: &ConversionRequest, encoding: ResolvedEncoding) -> Self {
        Self {
            source: request.source.clone(),
            destination: request.destination.clone(),
            resolved_encoding: Some(encoding),
            status: ConversionStatus::Success,
        }
    }

    /// 跳过结果
    pub fn skipped(source: PathBuf, destination: PathBuf, reason: String) -> Self {
        Self {
            source,
            destination,
            resolved_encoding: None,
            status: ConversionStatus::Skipped(reason),
        }
    }

    /// 失败结果
    pub fn failed(request: &ConversionRequest, error: Utf8ifyError) -> Self {
        Self {
            source: request.source.clone(),
            destination: request.destination.clone(),
            resolved_encoding: None,
            status: ConversionStatus::Failed(error),
        }
    }

    /// 是否成功
    pub fn is_success(&self) -> bool {
        matches!(self.status, ConversionStatus::Success)
    }

    /// 状态标签（用于报告输出）
    pub fn status_label(&self) -> &'static str {
        match self.status {
            ConversionStatus::Success => "success",
            ConversionStatus::Skipped(_) => "skipped",
            ConversionStatus::Failed(_) => "failed",
        }
    }

    /// 失败或跳过的说明文本
    pub fn detail(&self) -> Option<String> {
        match &self.status {
            ConversionStatus::Success => None,
            ConversionStatus::Skipped(reason) => Some(reason.clone()),
            ConversionStatus::Failed(err) => Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config() -> ConvertConfig {
        ConvertConfig {
            encoding: Some("utf-8".to_string()),
            sample_size: 1024,
            min_confidence: 0.2,
            create_output_dir: false,
            workers: 0,
            parallel: false,
        }
    }

    #[test]
    fn test_request_inherits_config() {
        let req = ConversionRequest::new(
            PathBuf::from("in.txt"),
            PathBuf::from("out.txt"),
            &config(),
        );
        assert_eq!(req.encoding.as_deref(), Some("utf-8"));
        assert_eq!(req.sample_size, 1024);
    }

    #[test]
    fn test_explicit_encoding_has_full_confidence() {
        let enc = ResolvedEncoding::explicit("GBK");
        assert_eq!(enc.name, "GBK");
        assert_eq!(enc.confidence, 1.0);
    }

    #[test]
    fn test_result_tags_request_paths() {
        let req = ConversionRequest::new(
            PathBuf::from("a/b.txt"),
            PathBuf::from("out/a/b.txt"),
            &config(),
        );
        let result = ConversionResult::success(&req, ResolvedEncoding::explicit("utf-8"));
        assert_eq!(result.source, Path::new("a/b.txt"));
        assert_eq!(result.destination, Path::new("out/a/b.txt"));
        assert!(result.is_success());
        assert_eq!(result.status_label(), "success");
        assert!(result.detail().is_none());
    }
}
