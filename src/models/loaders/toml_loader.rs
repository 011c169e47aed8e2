use crate::error::ConfigError;
use crate::models::cheat_sheet::{Category, CategoryCatalog};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// 从 TOML 文件加载分类目录
pub async fn load_catalog(path: &Path) -> Result<Vec<Category>, ConfigError> {
    let path_str = path.display().to_string();
    if !path.exists() {
        return Err(ConfigError::CatalogNotFound { path: path_str });
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::CatalogRead {
            path: path_str.clone(),
            source,
        })?;

    let categories = parse_catalog(&content).map_err(|source| ConfigError::CatalogParse {
        path: path_str.clone(),
        source,
    })?;

    info!("成功加载分类目录: {} ({} 个分类)", path_str, categories.len());
    Ok(categories)
}

/// 解析分类目录内容
///
/// - 没有速查表的分类会被丢弃
/// - 重复的分类 ID 只保留第一个
pub fn parse_catalog(content: &str) -> Result<Vec<Category>, toml::de::Error> {
    let catalog: CategoryCatalog = toml::from_str(content)?;

    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(catalog.categories.len());
    for mut category in catalog.categories {
        category.id = category.id.trim().to_string();
        if category.cheat_sheets.is_empty() {
            warn!("分类 {} 没有速查表，已跳过", category.id);
            continue;
        }
        if !seen.insert(category.id.clone()) {
            warn!("分类 ID 重复: {}，保留第一个", category.id);
            continue;
        }
        categories.push(category);
    }

    Ok(categories)
}
