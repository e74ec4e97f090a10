//! # utf8ify - 批量文本转码工具
//!
//! 将任意编码的文本文件（自动检测或显式指定）重新编码为 UTF-8，
//! 支持单文件与递归目录批量模式，批量模式可并行。
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/      (文件收集与批量执行)
//!   │     ├── converter   (单文件转换)
//!   │     └── detector    (编码检测)
//!   ├── models/     (请求/结果/配置数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod converter;
mod detector;
mod error;
mod models;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
