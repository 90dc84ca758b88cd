//! 一次运行的显式配置. 只在边界处校验一次, 数值核心不读取任何全局状态.

use std::path::{Path, PathBuf};

use crate::consts::DEFAULT_COMPONENTS;
use crate::error::ConfigError;
use crate::io::corr_output_name;
use crate::normalize::ZeroVariancePolicy;

/// 校验结果.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 路径非空且指向已存在的文件.
fn check_file(name: &'static str, p: &Path) -> ConfigResult<()> {
    if p.as_os_str().is_empty() {
        Err(ConfigError::MissingPath(name))
    } else if !p.is_file() {
        Err(ConfigError::NotFound(p.to_path_buf()))
    } else {
        Ok(())
    }
}

/// 目录存在. 空路径视为当前目录.
fn check_dir(p: &Path) -> ConfigResult<()> {
    if p.as_os_str().is_empty() || p.is_dir() {
        Ok(())
    } else {
        Err(ConfigError::NotADirectory(p.to_path_buf()))
    }
}

/// CompCor 成分提取配置.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompCorConfig {
    /// 4D 功能像路径.
    pub func: PathBuf,
    /// 掩膜路径 (通常为白质或脑脊液掩膜).
    pub mask: PathBuf,
    /// 成分文本矩阵输出路径.
    pub output: PathBuf,
    /// 成分个数, 默认为 5.
    pub n_components: usize,
    /// 标准化时零方差体素的处理策略.
    pub zero_variance: ZeroVariancePolicy,
}

impl Default for CompCorConfig {
    fn default() -> Self {
        Self {
            func: PathBuf::new(),
            mask: PathBuf::new(),
            output: PathBuf::new(),
            n_components: DEFAULT_COMPONENTS,
            zero_variance: ZeroVariancePolicy::default(),
        }
    }
}

impl CompCorConfig {
    /// 使用默认成分个数与零方差策略创建配置.
    pub fn new<P, Q, R>(func: P, mask: Q, output: R) -> Self
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
        R: Into<PathBuf>,
    {
        Self {
            func: func.into(),
            mask: mask.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    /// 设置成分个数.
    #[inline]
    pub fn with_components(mut self, n: usize) -> Self {
        self.n_components = n;
        self
    }

    /// 设置零方差策略.
    #[inline]
    pub fn with_zero_variance(mut self, policy: ZeroVariancePolicy) -> Self {
        self.zero_variance = policy;
        self
    }

    /// 检查输入文件存在, 输出所在目录存在, 且成分个数为正.
    pub fn validate(&self) -> ConfigResult<()> {
        check_file("func", &self.func)?;
        check_file("mask", &self.mask)?;
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("output"));
        }
        if let Some(parent) = self.output.parent() {
            check_dir(parent)?;
        }
        if self.n_components == 0 {
            return Err(ConfigError::ZeroComponents);
        }
        Ok(())
    }
}

/// 种子相关配置.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeedCorrConfig {
    /// 4D 功能像路径.
    pub func: PathBuf,
    /// 种子掩膜路径.
    pub seed: PathBuf,
    /// 脑掩膜路径.
    pub mask: PathBuf,
    /// 输出目录. 为 `None` 时使用功能像所在目录.
    pub output_dir: Option<PathBuf>,
    /// 是否输出 Fisher z 变换后的相关图.
    pub fisher_z: bool,
}

impl SeedCorrConfig {
    /// 创建配置, 输出到功能像所在目录.
    pub fn new<P, Q, R>(func: P, seed: Q, mask: R) -> Self
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
        R: Into<PathBuf>,
    {
        Self {
            func: func.into(),
            seed: seed.into(),
            mask: mask.into(),
            ..Self::default()
        }
    }

    /// 设置输出目录.
    #[inline]
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// 设置是否做 Fisher z 变换.
    #[inline]
    pub fn with_fisher_z(mut self, on: bool) -> Self {
        self.fisher_z = on;
        self
    }

    /// 实际使用的输出目录.
    pub fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(d) => d.clone(),
            None => self
                .func
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    /// 相关图输出路径 `<output_dir>/corr_<seed>_<func>.nii.gz`.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir()
            .join(corr_output_name(&self.seed, &self.func))
    }

    /// 检查三个输入文件存在, 且输出目录存在.
    pub fn validate(&self) -> ConfigResult<()> {
        check_file("func", &self.func)?;
        check_file("seed", &self.seed)?;
        check_file("mask", &self.mask)?;
        check_dir(&self.output_dir())
    }
}
