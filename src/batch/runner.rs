//! # 批量执行器
//!
//! 顺序或并行执行批量转换任务。
//!
//! ## 功能
//! - 基于 rayon 的固定大小工作池（可选）
//! - 进度条显示
//! - 结果收集与汇总统计，单个失败不影响其余文件
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::models::{ConversionRequest, ConversionResult, ConversionStatus};
use crate::utils::progress;

use rayon::prelude::*;

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 成功数量
    pub success: usize,
    /// 跳过数量
    pub skipped: usize,
    /// 失败数量
    pub failed: usize,
    /// 全部结果，完成顺序不定，每项携带来源请求的路径
    pub results: Vec<ConversionResult>,
}

impl BatchResult {
    /// 合并单个转换结果
    pub fn merge(&mut self, result: ConversionResult) {
        match result.status {
            ConversionStatus::Success => self.success += 1,
            ConversionStatus::Skipped(_) => self.skipped += 1,
            ConversionStatus::Failed(_) => self.failed += 1,
        }
        self.results.push(result);
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }

    /// 是否存在失败项（决定进程退出码）
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 是否启用并行工作池
    parallel: bool,
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器
    pub fn new(parallel: bool, jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { parallel, jobs }
    }

    /// 处理请求列表
    ///
    /// 每个请求由处理闭包独立执行，失败不会中断其余请求。
    pub fn run<F>(&self, requests: &[ConversionRequest], processor: F) -> BatchResult
    where
        F: Fn(&ConversionRequest) -> ConversionResult + Sync + Send,
    {
        let pb = progress::create_progress_bar(requests.len() as u64, "Converting");

        let process = |request: &ConversionRequest| {
            let result = processor(request);
            pb.inc(1);
            result
        };

        let results: Vec<ConversionResult> = if self.parallel {
            // 固定大小工作池，工作线程间不共享可变转换状态
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .unwrap();

            pool.install(|| requests.par_iter().map(&process).collect())
        } else {
            requests.iter().map(&process).collect()
        };

        pb.finish_and_clear();

        let mut batch_result = BatchResult::default();
        for result in results {
            batch_result.merge(result);
        }

        batch_result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Utf8ifyError;
    use crate::models::{ConvertConfig, ResolvedEncoding};
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn requests(n: usize) -> Vec<ConversionRequest> {
        let config = ConvertConfig {
            encoding: None,
            sample_size: 1024,
            min_confidence: 0.2,
            create_output_dir: false,
            workers: 0,
            parallel: false,
        };
        (0..n)
            .map(|i| {
                ConversionRequest::new(
                    PathBuf::from(format!("in/file{:02}.txt", i)),
                    PathBuf::from(format!("out/file{:02}.txt", i)),
                    &config,
                )
            })
            .collect()
    }

    /// file03 固定失败，其余成功
    fn fake_processor(request: &ConversionRequest) -> ConversionResult {
        if request.source.ends_with("file03.txt") {
            ConversionResult::failed(
                request,
                Utf8ifyError::DecodeError {
                    path: request.source.display().to_string(),
                    encoding: "UTF-8".to_string(),
                },
            )
        } else {
            ConversionResult::success(request, ResolvedEncoding::detected("ascii".into(), 1.0))
        }
    }

    fn result_set(result: &BatchResult) -> BTreeSet<(String, &'static str)> {
        result
            .results
            .iter()
            .map(|r| (r.source.display().to_string(), r.status_label()))
            .collect()
    }

    #[test]
    fn test_one_failure_does_not_abort_siblings() {
        let reqs = requests(8);
        let runner = BatchRunner::new(false, 1);
        let result = runner.run(&reqs, fake_processor);

        assert_eq!(result.total(), 8);
        assert_eq!(result.success, 7);
        assert_eq!(result.failed, 1);
        assert!(result.has_failures());
    }

    #[test]
    fn test_every_result_is_tagged_with_its_request() {
        let reqs = requests(5);
        let runner = BatchRunner::new(true, 4);
        let result = runner.run(&reqs, fake_processor);

        let sources: BTreeSet<_> = reqs.iter().map(|r| r.source.clone()).collect();
        for r in &result.results {
            assert!(sources.contains(&r.source));
        }
        assert_eq!(result.results.len(), reqs.len());
    }

    #[test]
    fn test_sequential_and_parallel_runs_are_equivalent() {
        let reqs = requests(16);

        let sequential = BatchRunner::new(false, 1).run(&reqs, fake_processor);
        let parallel = BatchRunner::new(true, 4).run(&reqs, fake_processor);

        assert_eq!(result_set(&sequential), result_set(&parallel));
        assert_eq!(sequential.success, parallel.success);
        assert_eq!(sequential.failed, parallel.failed);
    }

    #[test]
    fn test_zero_jobs_defaults_to_cpu_count() {
        let runner = BatchRunner::new(true, 0);
        assert!(runner.jobs >= 1);
    }

    #[test]
    fn test_merge_counts_skipped() {
        let mut batch = BatchResult::default();
        batch.merge(ConversionResult::skipped(
            PathBuf::from("in/link.txt"),
            PathBuf::from("out/link.txt"),
            "not a regular file".to_string(),
        ));
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.total(), 1);
        assert!(!batch.has_failures());
    }
}
