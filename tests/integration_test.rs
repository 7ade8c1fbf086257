mod common;

use std::sync::Arc;

use common::ScriptedClient;
use paper_audit::utils::logging;
use paper_audit::{App, Config};

fn config_in(dir: &std::path::Path) -> Config {
    Config {
        input_folder: dir.join("papers").to_string_lossy().into_owned(),
        output_folder: dir.join("output").to_string_lossy().into_owned(),
        output_log_file: dir.join("output.txt").to_string_lossy().into_owned(),
        failure_log_file: dir.join("failures.txt").to_string_lossy().into_owned(),
        max_concurrent_papers: 2,
        max_retries: 0,
        retry_backoff_ms: 1,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_app_writes_export_failures_and_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::create_dir_all(&config.input_folder).unwrap();

    for marker in ["paper-kiwi", "paper-mango"] {
        let document = common::paper(marker);
        std::fs::write(
            dir.path().join("papers").join(&document.filename),
            document.raw_text,
        )
        .unwrap();
    }
    // 隐藏文件与非文本文件不参与分析
    std::fs::write(dir.path().join("papers").join("._paper-kiwi.txt"), "junk").unwrap();
    std::fs::write(dir.path().join("papers").join("notes.md"), "junk").unwrap();

    let client = Arc::new(ScriptedClient::new(&["paper-kiwi", "paper-mango"]).fail("paper-mango", "synthesis"));
    let app = App::with_client(config.clone(), client).unwrap();
    let report = app.run().await.unwrap();

    assert_eq!(report.successes.len(), 1);
    assert_eq!(report.successes[0].filename.as_deref(), Some("paper-kiwi.txt"));
    assert_eq!(report.failures.len(), 1);

    // 结果导出
    let exports: Vec<_> = std::fs::read_dir(&config.output_folder)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(exports.len(), 1);
    let export: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&exports[0]).unwrap()).unwrap();
    assert_eq!(export["model"], "scripted");
    assert_eq!(export["records"][0]["display_title"], "Paper 1 (Paper-Kiwi)");
    assert_eq!(export["failures"][0]["filename"], "paper-mango.txt");

    // 失败记录
    let failures = std::fs::read_to_string(&config.failure_log_file).unwrap();
    assert!(failures.starts_with("文献 paper-mango.txt | 阶段调用失败"));

    // 运行日志
    let log = std::fs::read_to_string(&config.output_log_file).unwrap();
    assert!(log.contains("✅ paper-kiwi.txt"));
    assert!(log.contains("❌ paper-mango.txt"));
}

#[tokio::test]
async fn test_app_with_empty_folder() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::create_dir_all(&config.input_folder).unwrap();

    let client = Arc::new(ScriptedClient::new(&[]));
    let report = App::with_client(config.clone(), client)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.total(), 0);
    assert!(!std::path::Path::new(&config.output_folder).exists());
}

#[tokio::test]
async fn test_app_with_missing_folder_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let client = Arc::new(ScriptedClient::new(&[]));
    let result = App::with_client(config, client).unwrap().run().await;
    assert!(result.is_err());
}

/// 对真实推理服务跑一遍输入目录
///
/// 运行方式：
/// ```bash
/// INPUT_FOLDER=papers cargo test test_analyze_real_folder -- --ignored --nocapture
/// ```
#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_analyze_real_folder() {
    // 加载配置
    let config = Config::load().expect("加载配置失败");

    // 初始化日志
    logging::init_tracing(true);

    let report = App::initialize(config)
        .await
        .expect("初始化失败")
        .run()
        .await
        .expect("运行失败");

    println!(
        "成功 {} 篇，失败 {} 篇，提示 {} 条",
        report.successes.len(),
        report.failures.len(),
        report.advisories.len()
    );
}
