//! # convert 命令实现
//!
//! 将单个文件或整个目录树重新编码为 UTF-8。
//!
//! ## 功能
//! - 自动区分单文件与目录批量模式
//! - 批量模式镜像目录结构，支持并行处理
//! - 单个文件失败不中断批量，汇总后以非零退出码反映
//! - 可选 CSV 报告导出
//!
//! ## 依赖关系
//! - 使用 `cli/mod.rs` 定义的参数
//! - 使用 `batch/`, `converter.rs`
//! - 使用 `utils/output.rs`

use crate::batch::{map_destination, BatchResult, BatchRunner, FileCollector};
use crate::cli::Cli;
use crate::converter::FileConverter;
use crate::error::{Result, Utf8ifyError};
use crate::models::{ConversionRequest, ConversionResult, ConversionStatus, ConvertConfig};
use crate::utils::output;

use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 执行 convert 命令
pub fn execute(cli: Cli) -> Result<()> {
    output::print_header("Converting to UTF-8");

    let config = cli.to_config();

    if cli.source.is_file() {
        execute_single(&cli, &config)
    } else if cli.source.is_dir() {
        execute_batch(&cli, &config)
    } else {
        Err(Utf8ifyError::FileNotFound {
            path: cli.source.display().to_string(),
        })
    }
}

/// 单文件模式：没有兄弟任务需要保护，错误直接致命
fn execute_single(cli: &Cli, config: &ConvertConfig) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", cli.source.display()));

    let destination = single_destination(&cli.source, &cli.destination);
    let request = ConversionRequest::new(cli.source.clone(), destination, config);

    let converter = FileConverter::new(config.create_output_dir, config.min_confidence);
    let result = converter.convert(&request);

    if let Some(report_path) = &cli.report {
        save_report_csv(std::slice::from_ref(&result), report_path)?;
    }

    let source = result.source.display().to_string();
    let destination = result.destination.display().to_string();
    let encoding = describe_encoding(&result);

    match result.status {
        ConversionStatus::Success => {
            output::print_conversion(&source, &destination, &encoding);
            output::print_done("1 file converted");
            Ok(())
        }
        ConversionStatus::Skipped(reason) => {
            output::print_warning(&format!("Skipped {}: {}", source, reason));
            Ok(())
        }
        ConversionStatus::Failed(e) => Err(e),
    }
}

/// 批量处理模式
fn execute_batch(cli: &Cli, config: &ConvertConfig) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", cli.source.display()));

    let collector = FileCollector::new(cli.source.clone()).with_pattern(&cli.pattern);
    let collected = collector.collect()?;

    for path in &collected.skipped {
        output::print_skip(&format!("Not a regular file, skipping: {}", path.display()));
    }

    if collected.files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            cli.pattern
        ));
        return Ok(());
    }

    output::print_info(&format!(
        "Found {} files to convert",
        collected.files.len()
    ));

    if config.parallel {
        let workers = if config.workers == 0 {
            num_cpus::get()
        } else {
            config.workers
        };
        output::print_info(&format!("Using {} parallel workers", workers));
    }

    let requests: Vec<ConversionRequest> = collected
        .files
        .iter()
        .map(|file| {
            ConversionRequest::new(
                file.clone(),
                map_destination(file, &cli.source, &cli.destination),
                config,
            )
        })
        .collect();

    let converter = FileConverter::new(config.create_output_dir, config.min_confidence);
    let runner = BatchRunner::new(config.parallel, config.workers);
    let mut result = runner.run(&requests, |request| converter.convert(request));

    // 非常规条目计入跳过统计
    for path in collected.skipped {
        let destination = map_destination(&path, &cli.source, &cli.destination);
        result.merge(ConversionResult::skipped(
            path,
            destination,
            "not a regular file".to_string(),
        ));
    }

    if cli.verbose {
        for r in result.results.iter().filter(|r| r.is_success()) {
            output::print_conversion(
                &r.source.display().to_string(),
                &r.destination.display().to_string(),
                &describe_encoding(r),
            );
        }
    }

    output::print_separator();
    output::print_done(&format!(
        "Batch complete: {} success, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    ));

    if result.has_failures() {
        print_failure_table(&result);
    }

    if let Some(report_path) = &cli.report {
        save_report_csv(&result.results, report_path)?;
        output::print_success(&format!("Report saved to '{}'", report_path.display()));
    }

    if result.has_failures() {
        return Err(Utf8ifyError::BatchFailed {
            failed: result.failed,
            total: result.total(),
        });
    }

    Ok(())
}

/// 目标为已存在目录时，在其下沿用来源文件名
fn single_destination(source: &Path, destination: &Path) -> PathBuf {
    if destination.is_dir() {
        match source.file_name() {
            Some(name) => destination.join(name),
            None => destination.to_path_buf(),
        }
    } else {
        destination.to_path_buf()
    }
}

/// 编码描述文本（用于转换成功消息）
fn describe_encoding(result: &ConversionResult) -> String {
    match &result.resolved_encoding {
        Some(e) => format!("{}, confidence {:.2}", e.name, e.confidence),
        None => "unknown".to_string(),
    }
}

/// 失败明细行
#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Error")]
    error: String,
}

/// 打印失败明细表格
fn print_failure_table(result: &BatchResult) {
    let rows: Vec<FailureRow> = result
        .results
        .iter()
        .filter_map(|r| match &r.status {
            ConversionStatus::Failed(e) => Some(FailureRow {
                file: r.source.display().to_string(),
                error: e.to_string(),
            }),
            _ => None,
        })
        .collect();

    let table = Table::new(&rows);
    println!("{}", table);
}

/// 报告行
#[derive(Serialize)]
struct ReportRow<'a> {
    source: String,
    destination: String,
    encoding: Option<&'a str>,
    confidence: Option<f32>,
    status: &'a str,
    detail: Option<String>,
}

/// 保存逐文件转换报告到 CSV
fn save_report_csv(results: &[ConversionResult], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for r in results {
        wtr.serialize(ReportRow {
            source: r.source.display().to_string(),
            destination: r.destination.display().to_string(),
            encoding: r.resolved_encoding.as_ref().map(|e| e.name.as_str()),
            confidence: r.resolved_encoding.as_ref().map(|e| e.confidence),
            status: r.status_label(),
            detail: r.detail(),
        })?;
    }

    wtr.flush().map_err(|e| Utf8ifyError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["utf8ify"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_single_destination_into_existing_directory() {
        let dir = TempDir::new().unwrap();
        let mapped = single_destination(Path::new("data/in.txt"), dir.path());
        assert_eq!(mapped, dir.path().join("in.txt"));
    }

    #[test]
    fn test_single_destination_plain_file_path() {
        let mapped = single_destination(Path::new("data/in.txt"), Path::new("out/renamed.txt"));
        assert_eq!(mapped, PathBuf::from("out/renamed.txt"));
    }

    #[test]
    fn test_single_file_mode_end_to_end() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.txt");
        let destination = dir.path().join("out.txt");
        fs::write(&source, "好きな音楽\n").unwrap();

        execute(cli(&[
            "-s",
            source.to_str().unwrap(),
            "-d",
            destination.to_str().unwrap(),
        ]))
        .unwrap();

        assert_eq!(fs::read_to_string(&destination).unwrap(), "好きな音楽\n");
    }

    #[test]
    fn test_single_file_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.txt");
        let destination = dir.path().join("out.txt");
        fs::write(&source, [0x81, 0x40]).unwrap();

        let err = execute(cli(&[
            "-s",
            source.to_str().unwrap(),
            "-d",
            destination.to_str().unwrap(),
            "-e",
            "utf-8",
        ]))
        .unwrap_err();

        assert!(matches!(err, Utf8ifyError::DecodeError { .. }));
        assert!(!destination.exists());
    }

    #[test]
    fn test_batch_mirrors_directory_tree() {
        let dir = TempDir::new().unwrap();
        let source_root = dir.path().join("in");
        let destination_root = dir.path().join("out");
        fs::create_dir_all(source_root.join("a/b")).unwrap();
        fs::write(source_root.join("top.txt"), "one\n").unwrap();
        fs::write(source_root.join("a/mid.txt"), "two\n").unwrap();
        fs::write(source_root.join("a/b/deep.txt"), "three\n").unwrap();

        execute(cli(&[
            "-s",
            source_root.to_str().unwrap(),
            "-d",
            destination_root.to_str().unwrap(),
            "--create-output-dir",
        ]))
        .unwrap();

        assert_eq!(
            fs::read_to_string(destination_root.join("a/b/deep.txt")).unwrap(),
            "three\n"
        );
        assert_eq!(
            fs::read_to_string(destination_root.join("a/mid.txt")).unwrap(),
            "two\n"
        );
        assert_eq!(
            fs::read_to_string(destination_root.join("top.txt")).unwrap(),
            "one\n"
        );
    }

    #[test]
    fn test_batch_with_one_bad_file_converts_the_rest() {
        let dir = TempDir::new().unwrap();
        let source_root = dir.path().join("in");
        let destination_root = dir.path().join("out");
        fs::create_dir_all(&source_root).unwrap();
        fs::write(source_root.join("good1.txt"), "fine\n").unwrap();
        fs::write(source_root.join("good2.txt"), "also fine\n").unwrap();
        fs::write(source_root.join("bad.txt"), [0x81, 0x40]).unwrap();

        let err = execute(cli(&[
            "-s",
            source_root.to_str().unwrap(),
            "-d",
            destination_root.to_str().unwrap(),
            "-e",
            "utf-8",
            "--create-output-dir",
        ]))
        .unwrap_err();

        match err {
            Utf8ifyError::BatchFailed { failed, total } => {
                assert_eq!(failed, 1);
                assert_eq!(total, 3);
            }
            other => panic!("expected BatchFailed, got {:?}", other),
        }

        assert!(destination_root.join("good1.txt").exists());
        assert!(destination_root.join("good2.txt").exists());
        assert!(!destination_root.join("bad.txt").exists());
    }

    #[test]
    fn test_parallel_batch_matches_sequential() {
        let dir = TempDir::new().unwrap();
        let source_root = dir.path().join("in");
        fs::create_dir_all(source_root.join("shared")).unwrap();
        fs::write(source_root.join("shared/a.txt"), "alpha\n").unwrap();
        fs::write(source_root.join("shared/b.txt"), "beta\n").unwrap();
        fs::write(source_root.join("c.txt"), "gamma\n").unwrap();

        let seq_root = dir.path().join("seq");
        let par_root = dir.path().join("par");

        execute(cli(&[
            "-s",
            source_root.to_str().unwrap(),
            "-d",
            seq_root.to_str().unwrap(),
            "--create-output-dir",
        ]))
        .unwrap();

        // 两个工作线程同时在 shared/ 下写入，父目录并发创建必须安全
        execute(cli(&[
            "-s",
            source_root.to_str().unwrap(),
            "-d",
            par_root.to_str().unwrap(),
            "--create-output-dir",
            "-p",
            "-w",
            "4",
        ]))
        .unwrap();

        for rel in ["shared/a.txt", "shared/b.txt", "c.txt"] {
            assert_eq!(
                fs::read(seq_root.join(rel)).unwrap(),
                fs::read(par_root.join(rel)).unwrap()
            );
        }
    }

    #[test]
    fn test_batch_report_csv() {
        let dir = TempDir::new().unwrap();
        let source_root = dir.path().join("in");
        let destination_root = dir.path().join("out");
        let report = dir.path().join("report.csv");
        fs::create_dir_all(&source_root).unwrap();
        fs::write(source_root.join("a.txt"), "hello\n").unwrap();
        fs::write(source_root.join("b.txt"), "world\n").unwrap();

        execute(cli(&[
            "-s",
            source_root.to_str().unwrap(),
            "-d",
            destination_root.to_str().unwrap(),
            "--create-output-dir",
            "--report",
            report.to_str().unwrap(),
        ]))
        .unwrap();

        let content = fs::read_to_string(&report).unwrap();
        assert!(content.starts_with("source,destination,encoding,confidence,status,detail"));
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("success"));
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let err = execute(cli(&["-s", "/nonexistent/input", "-d", "/tmp/out"])).unwrap_err();
        assert!(matches!(err, Utf8ifyError::FileNotFound { .. }));
    }
}
