//! # 命令执行模块
//!
//! 实现转换命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `converter.rs`, `utils/`
//! - 子模块: convert

pub mod convert;

use crate::cli::Cli;
use crate::error::Result;

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    convert::execute(cli)
}
