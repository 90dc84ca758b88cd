//! 命令行工具依赖的通用组件.

use std::io::{self, Write};

use clap::Args;
use log::LevelFilter;
use simple_logger::SimpleLogger;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 简单分隔线.
#[inline]
pub fn sep_to<W: Write>(mut w: W) -> io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 日志相关的命令行参数.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct LogArgs {
    /// 输出处理进度 (info 级别日志)
    #[arg(short, long)]
    pub verbose: bool,

    /// 输出调试信息 (debug 级别日志), 蕴含 --verbose
    #[arg(long)]
    pub debug: bool,
}

impl LogArgs {
    /// 参数对应的日志级别. 默认只输出警告与错误.
    pub fn level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else if self.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        }
    }
}

/// 初始化全局 logger. 环境变量 `RUST_LOG` 优先于命令行参数.
pub fn init_logger(args: &LogArgs) -> anyhow::Result<()> {
    SimpleLogger::new().with_level(args.level()).env().init()?;
    Ok(())
}
