use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 页面抓取错误
    #[error("抓取错误: {0}")]
    Fetch(#[from] FetchError),
    /// 出题错误
    #[error("出题错误: {0}")]
    Quiz(#[from] QuizError),
    /// 题库错误
    #[error("题库错误: {0}")]
    Bank(#[from] BankError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 页面抓取错误
///
/// 单个来源抓取失败不会中断整批，只会被跳过
#[derive(Debug, Error)]
pub enum FetchError {
    /// 网络请求失败
    #[error("请求失败 ({url}): {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 返回非 200 状态码
    #[error("页面返回状态码 {status}: {url}")]
    BadStatus { url: String, status: u16 },
    /// 其他抓取失败（测试替身等）
    #[error("抓取失败 ({url}): {message}")]
    Failed { url: String, message: String },
}

/// 出题错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    /// 事实为空或干扰项池不足 3 条
    #[error("事实不足: facts={facts}, 干扰项池={pool}")]
    InsufficientFacts { facts: usize, pool: usize },
    /// 所有来源都没有产出题目
    #[error("无法生成题目 (分类: {categories:?})")]
    NoQuestionsGenerated { categories: Vec<String> },
    /// 调用方取消了流程
    #[error("出题流程已取消")]
    Cancelled,
}

/// 题库错误
#[derive(Debug, Error)]
pub enum BankError {
    /// 读写题库文件失败
    #[error("题库文件读写失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析或序列化失败
    #[error("题库 JSON 处理失败: {0}")]
    Json(#[from] serde_json::Error),
    /// 既没有 version 也没有 meta 字段
    #[error("无法识别的题库格式")]
    UnknownFormat,
    /// 内存题库没有绑定文件
    #[error("题库没有绑定存储文件")]
    NoBackingStore,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 分类目录文件不存在
    #[error("分类目录文件不存在: {path}")]
    CatalogNotFound { path: String },
    /// 分类目录读取失败
    #[error("读取分类目录失败 ({path}): {source}")]
    CatalogRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 分类目录 TOML 解析失败
    #[error("分类目录解析失败 ({path}): {source}")]
    CatalogParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl FetchError {
    /// 创建通用抓取失败错误
    pub fn failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError::Failed {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl BankError {
    /// 创建题库文件读写错误
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        BankError::Io {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
