//! Internationalization (i18n) module
//!
//! Provides language detection and localized strings for the CLI interface.
//! Supports English and Chinese Simplified.
//! Note: Log messages and per-file result messages remain in English.

use std::sync::OnceLock;

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    ChineseSimplified,
}

/// Global language instance
static LANGUAGE: OnceLock<Language> = OnceLock::new();

/// Initialize and get the current language based on system locale
pub fn get_language() -> Language {
    *LANGUAGE.get_or_init(detect_language)
}

/// Detect system language from environment variables, then the OS locale
fn detect_language() -> Language {
    let locale = std::env::var("LC_ALL")
        .or_else(|_| std::env::var("LC_MESSAGES"))
        .or_else(|_| std::env::var("LANG"))
        .ok()
        .filter(|l| !l.is_empty())
        .or_else(sys_locale::get_locale)
        .unwrap_or_default();

    language_for_locale(&locale)
}

fn language_for_locale(locale: &str) -> Language {
    let locale = locale.to_lowercase();
    if locale.starts_with("zh") || locale.contains("chinese") || locale.contains("hans") {
        Language::ChineseSimplified
    } else {
        Language::English
    }
}

/// Localized strings for the CLI interface
pub struct Strings;

impl Strings {
    pub fn app_title() -> &'static str {
        match get_language() {
            Language::English => "EXIF Date Fixer",
            Language::ChineseSimplified => "EXIF 日期修复工具",
        }
    }

    pub fn scanning() -> &'static str {
        match get_language() {
            Language::English => "Scanning",
            Language::ChineseSimplified => "扫描目录",
        }
    }

    pub fn dry_run_tag() -> &'static str {
        match get_language() {
            Language::English => "(DRY RUN)",
            Language::ChineseSimplified => "（模拟运行）",
        }
    }

    pub fn recursive() -> &'static str {
        match get_language() {
            Language::English => "Recursive",
            Language::ChineseSimplified => "递归扫描",
        }
    }

    pub fn dry_run() -> &'static str {
        match get_language() {
            Language::English => "Dry Run",
            Language::ChineseSimplified => "模拟运行",
        }
    }

    pub fn supported_extensions() -> &'static str {
        match get_language() {
            Language::English => "Supported extensions",
            Language::ChineseSimplified => "支持的扩展名",
        }
    }

    pub fn yes() -> &'static str {
        match get_language() {
            Language::English => "Yes",
            Language::ChineseSimplified => "是",
        }
    }

    pub fn no() -> &'static str {
        match get_language() {
            Language::English => "No",
            Language::ChineseSimplified => "否",
        }
    }

    pub fn finding_files() -> &'static str {
        match get_language() {
            Language::English => "Finding files...",
            Language::ChineseSimplified => "正在查找文件...",
        }
    }

    pub fn no_files_found() -> &'static str {
        match get_language() {
            Language::English => "No supported files found.",
            Language::ChineseSimplified => "未找到支持的文件。",
        }
    }

    pub fn found_files(count: usize) -> String {
        match get_language() {
            Language::English => format!("Found {} files to process...", count),
            Language::ChineseSimplified => format!("找到 {} 个待处理文件...", count),
        }
    }

    pub fn path_not_exist(path: &str) -> String {
        match get_language() {
            Language::English => format!("Path '{}' does not exist.", path),
            Language::ChineseSimplified => format!("路径 '{}' 不存在。", path),
        }
    }

    pub fn status_updated() -> &'static str {
        match get_language() {
            Language::English => "Updated",
            Language::ChineseSimplified => "已更新",
        }
    }

    pub fn status_would_update() -> &'static str {
        match get_language() {
            Language::English => "Would update",
            Language::ChineseSimplified => "将更新",
        }
    }

    pub fn status_skipped() -> &'static str {
        match get_language() {
            Language::English => "Skipped",
            Language::ChineseSimplified => "已跳过",
        }
    }

    pub fn status_error() -> &'static str {
        match get_language() {
            Language::English => "Error",
            Language::ChineseSimplified => "错误",
        }
    }

    pub fn summary() -> &'static str {
        match get_language() {
            Language::English => "Summary",
            Language::ChineseSimplified => "处理摘要",
        }
    }

    pub fn total_files() -> &'static str {
        match get_language() {
            Language::English => "Total files",
            Language::ChineseSimplified => "文件总数",
        }
    }

    pub fn skipped_has_date() -> &'static str {
        match get_language() {
            Language::English => "Skipped (has date)",
            Language::ChineseSimplified => "已跳过（已有日期）",
        }
    }

    pub fn skipped_no_date() -> &'static str {
        match get_language() {
            Language::English => "Skipped (no date in filename)",
            Language::ChineseSimplified => "已跳过（文件名无日期）",
        }
    }

    pub fn errors() -> &'static str {
        match get_language() {
            Language::English => "Errors",
            Language::ChineseSimplified => "错误",
        }
    }

    pub fn dry_run_notice() -> &'static str {
        match get_language() {
            Language::English => "Dry run: no files were modified.",
            Language::ChineseSimplified => "模拟运行：未修改任何文件。",
        }
    }

    pub fn report_saved() -> &'static str {
        match get_language() {
            Language::English => "Report saved",
            Language::ChineseSimplified => "报告已保存",
        }
    }

    pub fn config_written() -> &'static str {
        match get_language() {
            Language::English => "Configuration written",
            Language::ChineseSimplified => "配置文件已生成",
        }
    }

    pub fn log_file() -> &'static str {
        match get_language() {
            Language::English => "Log file",
            Language::ChineseSimplified => "日志文件",
        }
    }
}
