//! # 批量处理模块
//!
//! 提供目录树的文件批量转换能力。
//!
//! ## 功能
//! - 递归收集常规文件，跳过符号链接等非常规条目
//! - glob 模式过滤
//! - 目标路径镜像映射（本模块是路径映射的唯一所有者）
//! - 顺序或并行分发，进度反馈与结果汇总
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `walkdir` 遍历目录
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::{map_destination, CollectedFiles, FileCollector};
pub use runner::{BatchResult, BatchRunner};
