/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- 抓取配置 ---
    /// 同时进行的页面抓取数量
    pub max_fetch_workers: usize,
    /// 单次出题最多抓取的页面数
    pub max_pages_per_request: usize,
    /// 每个分类最多抓取的速查表数量
    pub pages_per_category: usize,
    /// 单次请求超时（秒）
    pub fetch_timeout_secs: u64,
    /// 每次抓取前的礼貌等待（毫秒）
    pub politeness_delay_ms: u64,
    /// 抓取时使用的 User-Agent
    pub user_agent: String,
    /// 事实最短长度（字符）
    pub min_fact_len: usize,
    /// 事实长度上限（字符，不含）
    pub max_fact_len: usize,
    // --- 缓存配置 ---
    /// 页面内容缓存有效期（秒）
    pub cache_ttl_secs: i64,
    // --- 数据文件 ---
    /// 分类目录 TOML 文件
    pub catalog_path: String,
    /// 题库 JSON 文件
    pub bank_path: String,
    /// 仅使用题库出题，不访问网络
    pub offline_mode: bool,
    /// 把在线生成的题目追加进题库并保存
    pub archive_generated: bool,
    // --- 题干改写（LLM） ---
    pub stem_enhancer_enabled: bool,
    /// 单次改写的超时（毫秒）
    pub stem_timeout_ms: u64,
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 出题请求 ---
    /// 选中的分类 ID，为空表示全部
    pub quiz_categories: Vec<String>,
    pub quiz_count: usize,
    /// 随机种子，不设置时使用当前时间
    pub quiz_seed: Option<u64>,
    /// 试卷输出文件
    pub output_path: String,
    // --- 日志 ---
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_fetch_workers: 4,
            max_pages_per_request: 8,
            pages_per_category: 1,
            fetch_timeout_secs: 12,
            politeness_delay_ms: 300,
            user_agent: "CheatSheet-Quiz-Bot/1.0".to_string(),
            min_fact_len: 10,
            max_fact_len: 260,
            cache_ttl_secs: 6 * 60 * 60,
            catalog_path: "categories.toml".to_string(),
            bank_path: "data/question_bank.json".to_string(),
            offline_mode: false,
            archive_generated: false,
            stem_enhancer_enabled: false,
            stem_timeout_ms: 4000,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            quiz_categories: Vec::new(),
            quiz_count: 20,
            quiz_seed: None,
            output_path: "quiz.json".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_fetch_workers: env_parse("MAX_FETCH_WORKERS").unwrap_or(default.max_fetch_workers),
            max_pages_per_request: env_parse("MAX_PAGES_PER_REQUEST").unwrap_or(default.max_pages_per_request),
            pages_per_category: env_parse("PAGES_PER_CATEGORY").unwrap_or(default.pages_per_category),
            fetch_timeout_secs: env_parse("FETCH_TIMEOUT_SECS").unwrap_or(default.fetch_timeout_secs),
            politeness_delay_ms: env_parse("POLITENESS_DELAY_MS").unwrap_or(default.politeness_delay_ms),
            user_agent: std::env::var("USER_AGENT").unwrap_or(default.user_agent),
            min_fact_len: env_parse("MIN_FACT_LEN").unwrap_or(default.min_fact_len),
            max_fact_len: env_parse("MAX_FACT_LEN").unwrap_or(default.max_fact_len),
            cache_ttl_secs: env_parse("CACHE_TTL_SECS").unwrap_or(default.cache_ttl_secs),
            catalog_path: std::env::var("CATALOG_PATH").unwrap_or(default.catalog_path),
            bank_path: std::env::var("BANK_PATH").unwrap_or(default.bank_path),
            offline_mode: env_parse("OFFLINE_MODE").unwrap_or(default.offline_mode),
            archive_generated: env_parse("ARCHIVE_GENERATED").unwrap_or(default.archive_generated),
            stem_enhancer_enabled: env_parse("STEM_ENHANCER_ENABLED").unwrap_or(default.stem_enhancer_enabled),
            stem_timeout_ms: env_parse("STEM_TIMEOUT_MS").unwrap_or(default.stem_timeout_ms),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            quiz_categories: std::env::var("QUIZ_CATEGORIES")
                .map(|v| parse_id_list(&v))
                .unwrap_or(default.quiz_categories),
            quiz_count: env_parse("QUIZ_COUNT").unwrap_or(default.quiz_count),
            quiz_seed: env_parse("QUIZ_SEED").or(default.quiz_seed),
            output_path: std::env::var("OUTPUT_PATH").unwrap_or(default.output_path),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// 解析逗号分隔的分类 ID 列表，忽略空项
pub fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
