//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use once_cell::sync::OnceCell;
use rat_embed_lang::register_translations;
use std::collections::HashMap;

static REGISTERED: OnceCell<()> = OnceCell::new();

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

impl ErrorMessageI18n {
    fn insert(
        translations: &mut HashMap<String, HashMap<String, String>>,
        key: &str,
        zh: &str,
        en: &str,
        ja: &str,
    ) {
        let mut messages = HashMap::new();
        messages.insert("zh-CN".to_string(), zh.to_string());
        messages.insert("en-US".to_string(), en.to_string());
        messages.insert("ja-JP".to_string(), ja.to_string());
        translations.insert(key.to_string(), messages);
    }

    /// 注册所有错误消息翻译
    pub fn register_all_translations() {
        let mut translations = HashMap::new();

        Self::insert(
            &mut translations,
            "error.pool_exhausted",
            "连接池已耗尽: {timeout}ms 内没有可用连接",
            "Connection pool exhausted: no connection available within {timeout}ms",
            "接続プールが枯渇しました: {timeout}ms 以内に利用可能な接続がありません",
        );
        Self::insert(
            &mut translations,
            "error.connection_create",
            "创建数据库连接失败: {message}",
            "Failed to create database connection: {message}",
            "データベース接続の作成に失敗しました: {message}",
        );
        Self::insert(
            &mut translations,
            "error.pool_closed",
            "连接池已关闭",
            "Connection pool is closed",
            "接続プールは閉じられています",
        );
        Self::insert(
            &mut translations,
            "error.query",
            "查询执行失败: {message}",
            "Query execution failed: {message}",
            "クエリ実行が失敗しました: {message}",
        );
        Self::insert(
            &mut translations,
            "error.config",
            "配置错误: {message}",
            "Configuration error: {message}",
            "設定エラー: {message}",
        );
        Self::insert(
            &mut translations,
            "error.backend_not_found",
            "后端 '{backend}' 没有注册连接池",
            "No connection pool registered for backend '{backend}'",
            "バックエンド '{backend}' に接続プールが登録されていません",
        );
        Self::insert(
            &mut translations,
            "error.serialization",
            "数据序列化失败: {message}",
            "Data serialization failed: {message}",
            "データシリアライズが失敗しました: {message}",
        );
        Self::insert(
            &mut translations,
            "error.io",
            "IO错误: {message}",
            "IO error: {message}",
            "IOエラー: {message}",
        );

        // 注册所有翻译
        register_translations(translations);
    }

    /// 初始化错误消息多语言支持，重复调用只注册一次
    pub fn init() {
        REGISTERED.get_or_init(Self::register_all_translations);

        // 从环境变量获取语言设置，默认为zh-CN
        let lang = std::env::var("RAT_LANG")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_else(|_| "zh-CN".to_string());

        // 标准化语言代码
        use rat_embed_lang::normalize_language_code;
        let normalized_lang = normalize_language_code(&lang);
        set_language(&normalized_lang);
    }
}

/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{current_language, set_language, t, tf};
