//! # 编码解析器
//!
//! 解析单个文件的来源编码：显式指定或基于头部采样的统计检测。
//!
//! ## 功能
//! - 显式编码直接返回，不读取文件内容
//! - 读取文件头部至多 `sample_size` 字节作为检测样本
//! - 基于 `chardet` 的统计字符集检测，带置信度阈值
//!
//! ## 依赖关系
//! - 被 `converter.rs` 调用
//! - 使用 `chardet` 进行字符集检测

use crate::error::{Result, Utf8ifyError};
use crate::models::ResolvedEncoding;

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 编码解析器
pub struct EncodingResolver {
    /// 检测采样字节数
    sample_size: usize,
    /// 置信度下限，低于该值视为检测失败
    min_confidence: f32,
}

impl EncodingResolver {
    /// 创建新的编码解析器
    pub fn new(sample_size: usize, min_confidence: f32) -> Self {
        Self {
            sample_size,
            min_confidence,
        }
    }

    /// 解析文件编码
    ///
    /// 显式编码原样返回（置信度 1.0），错误的显式值会在解码阶段暴露；
    /// 否则对文件头部采样做统计检测，返回最高置信度的候选。
    pub fn resolve(&self, path: &Path, explicit: Option<&str>) -> Result<ResolvedEncoding> {
        if let Some(label) = explicit {
            if !label.is_empty() {
                return Ok(ResolvedEncoding::explicit(label));
            }
        }

        let sample = self.read_sample(path)?;

        if sample.is_empty() {
            return Err(Utf8ifyError::DetectionError {
                path: path.display().to_string(),
                reason: "file is empty".to_string(),
            });
        }

        let (charset, confidence, _language) = chardet::detect(&sample);

        if charset.is_empty() {
            return Err(Utf8ifyError::DetectionError {
                path: path.display().to_string(),
                reason: "detector returned no candidate".to_string(),
            });
        }

        if confidence < self.min_confidence {
            return Err(Utf8ifyError::DetectionError {
                path: path.display().to_string(),
                reason: format!(
                    "confidence {:.2} below threshold {:.2} (best guess: {})",
                    confidence, self.min_confidence, charset
                ),
            });
        }

        Ok(ResolvedEncoding::detected(charset, confidence))
    }

    /// 读取文件头部至多 `sample_size` 字节
    fn read_sample(&self, path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path).map_err(|e| Utf8ifyError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut sample = Vec::new();
        file.take(self.sample_size as u64)
            .read_to_end(&mut sample)
            .map_err(|e| Utf8ifyError::FileReadError {
                path: path.display().to_string(),
                source: e,
            })?;

        Ok(sample)
    }
}
