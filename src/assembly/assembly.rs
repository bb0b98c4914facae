use apng_assembler::apng::{ApngEncoder, FrameOptions, FrameSource, RgbaFrame};
use apng_assembler::Error;
use colored::Colorize;
use png::Compression;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::available_parallelism;
use std::time::Instant;

use crate::thread::ThreadPool;

/// 进度条长度
const BAR_WIDTH: usize = 20;
/// 转换文件大小
const BYTES_INTEGER: f64 = 1024.00;

#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("no png frames found in {}", .0.display())]
    NoFrames(PathBuf),

    #[error("{}: {source}", .path.display())]
    Frame {
        path: PathBuf,
        #[source]
        source: Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// 把一个目录下的 PNG 组装成 APNG
#[derive(Debug)]
pub struct Assembly {
    /// 帧所在目录
    path: PathBuf,
    /// 输出文件路径
    output: PathBuf,
    /// 每帧显示时长，毫秒
    delay_ms: u16,
    /// 循环次数，0 为无限循环
    plays: u32,
    /// png编码压缩等级
    compression: Compression,
    /// 文件扩展名，用于检测png文件
    extension: &'static [&'static str],
    /// 按文件名排序的帧列表
    worklist: Vec<Work>,
    /// 线程池
    thread_pool: ThreadPool,
    /// 工作开始时间
    start_time: Instant,
}

impl Assembly {
    pub fn new(
        path: PathBuf,
        output: PathBuf,
        delay_ms: u16,
        plays: u32,
        compression: Compression,
    ) -> Assembly {
        // 根据系统并行资源数量创建线程池
        let parallelism = available_parallelism().map(|n| n.get()).unwrap_or(1);
        let thread_pool = ThreadPool::new(parallelism);
        log::debug!("thread pool with {} workers", thread_pool.size());

        Assembly {
            path,
            output,
            delay_ms,
            plays,
            compression,
            extension: &["png"],
            worklist: vec![],
            thread_pool,
            start_time: Instant::now(),
        }
    }

    /// 检查文件扩展名
    fn has_extension(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension().and_then(OsStr::to_str) {
            return self
                .extension
                .iter()
                .any(|x| x.eq_ignore_ascii_case(extension));
        }

        false
    }

    /// 生成工作列表：目录下（不递归）所有 png 文件，输出文件本身除外
    fn generate_worklist(&mut self) -> Result<(), AssembleError> {
        let output = resolve(&self.output);
        let mut paths = vec![];
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            let is_output = output.is_some() && resolve(&path) == output;
            if path.is_file() && self.has_extension(&path) && !is_output {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        self.worklist = paths
            .into_iter()
            .enumerate()
            .map(|(id, path)| Work { id, path })
            .collect();
        Ok(())
    }

    /// 多线程解码并重新编码所有帧，结果按工作列表顺序返回
    fn run_worklist(&self) -> Vec<Result<Vec<u8>, Error>> {
        let (sender, receiver) = mpsc::channel();

        for work in &self.worklist {
            let sender = sender.clone();
            let path = work.path.clone();
            let id = work.id;
            let compression = self.compression;
            self.thread_pool.execute(move || {
                let encoded = RgbaFrame::open(&path)
                    .and_then(|frame| frame.with_compression(compression).encode_png());
                let _ = sender.send((id, encoded));
            });
        }
        drop(sender);

        let total = self.worklist.len();
        let mut slots: Vec<Option<Result<Vec<u8>, Error>>> = (0..total).map(|_| None).collect();
        let mut done = 0;
        update_progress_bar(done, total);
        for (id, encoded) in receiver.iter() {
            slots[id] = Some(encoded);
            done += 1;
            update_progress_bar(done, total);
        }
        println!();

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(Error::InvalidFrame("worker exited early"))))
            .collect()
    }

    /// 组装并写入输出文件
    pub fn assemble(&mut self) -> Result<(), AssembleError> {
        self.generate_worklist()?;
        if self.worklist.is_empty() {
            return Err(AssembleError::NoFrames(self.path.clone()));
        }
        println!(
            "Found {} frames in {}",
            self.worklist.len().to_string().cyan(),
            self.path.display()
        );

        let encoded = self.run_worklist();
        let mut encoder = ApngEncoder::new().with_plays(self.plays);
        for (work, png) in self.worklist.iter().zip(encoded) {
            png.and_then(|png| encoder.add_encoded(png, FrameOptions::new(self.delay_ms)))
                .map_err(|source| AssembleError::Frame {
                    path: work.path.clone(),
                    source,
                })?;
        }

        let frames = encoder.len();
        let apng = encoder.finish();
        fs::write(&self.output, &apng).map_err(|source| AssembleError::Write {
            path: self.output.clone(),
            source,
        })?;

        println!(
            "Wrote {} ({} frames, {:.2} KiB)",
            self.output.display().to_string().green(),
            frames,
            apng.len() as f64 / BYTES_INTEGER
        );
        println!(
            "Total time: {:.3}s",
            self.start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }
}

/// 规范化路径，用于判断两个路径是否指向同一文件。
///
/// 文件可能还不存在（输出文件），所以只规范化父目录再拼接文件名。
fn resolve(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::canonicalize(parent).ok().map(|parent| parent.join(name))
}

/// 更新进度条
fn update_progress_bar(done: usize, total: usize) {
    let perc = if total == 0 {
        1.0
    } else {
        done as f64 / total as f64
    };
    let filled = (perc * BAR_WIDTH as f64).floor() as usize;

    print!(
        "\rEncoding frames: {}{} {}%",
        "\u{25A0}".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        (perc * 100.0).trunc()
    );
    let _ = io::stdout().flush();
}

#[derive(Debug)]
struct Work {
    // 工作id，即帧序号
    id: usize,
    // 帧文件路径
    path: PathBuf,
}
