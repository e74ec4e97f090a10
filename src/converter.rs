//! # 文件转换器
//!
//! 将单个文件从解析得到的编码重新编码为 UTF-8。
//!
//! ## 功能
//! - 按需调用编码解析器（显式编码时跳过检测）
//! - 严格解码，无效字节序列视为失败
//! - 原子写入目标文件（临时文件 + 重命名）
//! - 所有错误在 `convert` 边界折叠为 Failed 结果
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 和 `batch/runner.rs` 的处理闭包调用
//! - 使用 `detector.rs` 解析编码
//! - 使用 `encoding_rs` 解码

use crate::detector::EncodingResolver;
use crate::error::{Result, Utf8ifyError};
use crate::models::{ConversionRequest, ConversionResult, ResolvedEncoding};

use encoding_rs::Encoding;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// 文件转换器
///
/// 无内部可变状态，可在工作线程间共享。
pub struct FileConverter {
    /// 是否自动创建缺失的目标目录
    create_output_dir: bool,
    /// 检测置信度下限
    min_confidence: f32,
}

impl FileConverter {
    /// 创建新的文件转换器
    pub fn new(create_output_dir: bool, min_confidence: f32) -> Self {
        Self {
            create_output_dir,
            min_confidence,
        }
    }

    /// 执行单文件转换
    ///
    /// 任何错误都在此边界折叠为 Failed 结果，不向调用方抛出。
    pub fn convert(&self, request: &ConversionRequest) -> ConversionResult {
        match self.try_convert(request) {
            Ok(encoding) => ConversionResult::success(request, encoding),
            Err(e) => ConversionResult::failed(request, e),
        }
    }

    /// 转换流程：解析编码 -> 读取 -> 解码 -> 写入
    fn try_convert(&self, request: &ConversionRequest) -> Result<ResolvedEncoding> {
        let resolver = EncodingResolver::new(request.sample_size, self.min_confidence);
        let resolved = resolver.resolve(&request.source, request.encoding.as_deref())?;

        let bytes = fs::read(&request.source).map_err(|e| Utf8ifyError::FileReadError {
            path: request.source.display().to_string(),
            source: e,
        })?;

        let text = decode_bytes(&bytes, &resolved.name, &request.source)?;

        self.ensure_parent_dir(&request.destination)?;
        write_atomic(&request.destination, text.as_bytes())?;

        Ok(resolved)
    }

    /// 确保目标父目录存在
    fn ensure_parent_dir(&self, destination: &Path) -> Result<()> {
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => return Ok(()),
        };

        if parent.exists() {
            return Ok(());
        }

        if !self.create_output_dir {
            return Err(Utf8ifyError::DestinationMissing {
                path: parent.display().to_string(),
            });
        }

        // 多个工作线程可能同时创建同一父目录，create_dir_all 幂等
        fs::create_dir_all(parent).map_err(|e| Utf8ifyError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })
    }
}

/// 解析编码标签为具体编码
///
/// 优先按 WHATWG 标签解析，失败时回退到 chardet 的标签映射表，
/// 再回退到下划线转连字符的写法。
fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    // chardet 对带 BOM 的 UTF-8 报告 utf-8-sig，WHATWG 标签表没有该名字
    if label.eq_ignore_ascii_case("utf-8-sig") {
        return Some(encoding_rs::UTF_8);
    }

    Encoding::for_label(label.as_bytes())
        .or_else(|| Encoding::for_label(chardet::charset2encoding(&label.to_string()).as_bytes()))
        .or_else(|| Encoding::for_label(label.replace('_', "-").as_bytes()))
}

/// 严格解码：无效字节序列返回 DecodeError，而非替换字符
fn decode_bytes<'a>(bytes: &'a [u8], label: &str, source: &Path) -> Result<Cow<'a, str>> {
    let encoding = encoding_for_label(label).ok_or_else(|| Utf8ifyError::UnknownEncoding {
        label: label.to_string(),
    })?;

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| Utf8ifyError::DecodeError {
            path: source.display().to_string(),
            encoding: encoding.name().to_string(),
        })
}

/// 原子写入：先写同目录临时文件再重命名
///
/// 写入中途失败只会留下临时文件，目标路径上不会出现半成品。
fn write_atomic(destination: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = destination
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("output");
    let tmp_path =
        destination.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()));

    fs::write(&tmp_path, bytes).map_err(|e| Utf8ifyError::FileWriteError {
        path: tmp_path.display().to_string(),
        source: e,
    })?;

    fs::rename(&tmp_path, destination).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        Utf8ifyError::FileWriteError {
            path: destination.display().to_string(),
            source: e,
        }
    })
}
