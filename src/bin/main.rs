use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use stock_whisper::allocation::Allocator;
use stock_whisper::backtest::Backtester;
use stock_whisper::config::{self, ApplicationConfig, LogConfig};
use stock_whisper::data_provider::CsvMarketDataSource;
use stock_whisper::domain_types::{total_invested, Candidate};
use stock_whisper::forecast::MeanReturnForecaster;
use stock_whisper::report::{self, BacktestSummary, DailyRecord, ReportFormat};
use stock_whisper::utils::{self, next_business_day, previous_business_day};

#[derive(Parser, Debug)]
#[command(name = "stock_whisper", version, about = "每日 Top-N 選股的預算分配與滾動回測")]
struct Cli {
    /// 配置文件路徑；未指定時依 STOCK_WHISPER_ENV 從 CONFIG_DIR 載入
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 執行滾動窗口回測並保存結果
    Backtest(BacktestArgs),
    /// 依預測報酬與開盤價產生一次分配計劃
    Allocate(AllocateArgs),
    /// 讀取已保存的回測結果並輸出彙總統計
    Summary(SummaryArgs),
    /// 顯示交易日曆
    Calendar {
        /// 參考日期（YYYY-MM-DD），預設為今日
        #[arg(long, value_parser = parse_cli_date)]
        date: Option<NaiveDate>,
    },
}

#[derive(Args, Debug)]
struct BacktestArgs {
    /// 以逗號分隔的標的池，預設使用配置中的 backtest.symbols
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,
    /// 嘗試回測的交易日數
    #[arg(long)]
    days: Option<usize>,
    /// 每日預算
    #[arg(long)]
    budget: Option<f64>,
    /// 起始日（YYYY-MM-DD），預設為今日
    #[arg(long, value_parser = parse_cli_date)]
    start: Option<NaiveDate>,
    /// 覆蓋 market_data.directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// 覆蓋 report.output_path
    #[arg(long)]
    output: Option<PathBuf>,
    /// json_lines 或 csv
    #[arg(long)]
    format: Option<String>,
    /// 不保存結果文件
    #[arg(long)]
    no_save: bool,
}

#[derive(Args, Debug)]
struct AllocateArgs {
    /// 候選與預測報酬，例如 TCS.NS=0.015,INFY.NS=0.012
    #[arg(long, value_delimiter = ',', value_parser = parse_pair, required = true)]
    candidates: Vec<(String, f64)>,
    /// 開盤價，例如 TCS.NS=3845,INFY.NS=1490
    #[arg(long, value_delimiter = ',', value_parser = parse_pair, required = true)]
    prices: Vec<(String, f64)>,
    /// 預算，預設使用 backtest.budget
    #[arg(long)]
    budget: Option<f64>,
    /// 持倉上限，預設使用 backtest.max_positions
    #[arg(long)]
    max_positions: Option<usize>,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// 結果文件，預設使用 report.output_path
    #[arg(long)]
    input: Option<PathBuf>,
    /// json_lines 或 csv，預設依副檔名推斷
    #[arg(long)]
    format: Option<String>,
}

fn parse_cli_date(value: &str) -> Result<NaiveDate, String> {
    utils::parse_date(value).map_err(|e| format!("無效日期 '{}': {}", value, e))
}

fn parse_pair(value: &str) -> Result<(String, f64), String> {
    let (symbol, number) = value
        .split_once('=')
        .ok_or_else(|| format!("格式應為 SYMBOL=VALUE: '{}'", value))?;
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(format!("缺少標的名稱: '{}'", value));
    }
    let number: f64 = number
        .trim()
        .parse()
        .map_err(|e| format!("無效數值 '{}': {}", number, e))?;
    Ok((symbol.to_string(), number))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化配置
    let app_config = match &cli.config {
        Some(path) => ApplicationConfig::load_file(path)
            .with_context(|| format!("無法加載配置文件 {}", path.display()))?,
        None => config::init_config().context("無法加載應用程序配置")?,
    };

    // 初始化日誌系統，guard 必須存活到程序結束
    let _log_guard = init_logging(&app_config.log)?;

    match cli.command {
        Command::Backtest(args) => run_backtest_command(&app_config, args),
        Command::Allocate(args) => run_allocate_command(&app_config, args),
        Command::Summary(args) => run_summary_command(&app_config, args),
        Command::Calendar { date } => {
            let date = date.unwrap_or_else(utils::today);
            println!("今日:         {}", date.format("%A, %d %B %Y"));
            println!("前一交易日:   {}", previous_business_day(date).format("%A, %d %B %Y"));
            println!("下一交易日:   {}", next_business_day(date).format("%A, %d %B %Y"));
            Ok(())
        }
    }
}

fn resolve_format(explicit: Option<&str>, path: &Path, fallback: &str) -> Result<ReportFormat> {
    match explicit {
        Some(format) => Ok(format.parse()?),
        None => match ReportFormat::from_path(path) {
            Some(format) => Ok(format),
            None => Ok(fallback.parse()?),
        },
    }
}

fn run_backtest_command(app_config: &ApplicationConfig, args: BacktestArgs) -> Result<()> {
    let mut backtest_config = app_config.backtest.clone();
    if let Some(days) = args.days {
        backtest_config.num_days = days;
    }
    if let Some(budget) = args.budget {
        backtest_config.budget = budget;
    }
    if !args.symbols.is_empty() {
        backtest_config.symbols = args.symbols;
    }

    let mut market_data_config = app_config.market_data.clone();
    if let Some(dir) = &args.data_dir {
        market_data_config.directory = dir.to_string_lossy().into_owned();
    }

    let market_data = Arc::new(CsvMarketDataSource::from_config(&market_data_config));
    let forecaster = Arc::new(MeanReturnForecaster::with_config(
        market_data.clone(),
        &app_config.forecast,
    ));

    let mut backtester = Backtester::new(forecaster, market_data)
        .with_config(&backtest_config)
        .context("回測參數無效")?;
    if let Some(start) = args.start {
        backtester = backtester.with_start_date(start);
    }

    let run = backtester.run(
        &backtest_config.symbols,
        backtest_config.num_days,
        backtest_config.budget,
    )?;

    for skipped in &run.skipped {
        println!("{}  跳過: {}", skipped.date, skipped.reason);
    }
    let records: Vec<DailyRecord> = run.results.iter().map(DailyRecord::from).collect();
    for record in &records {
        println!(
            "{}  投入 {:>10.2}  損益 {:>9.2}  {}",
            record.date,
            record.total_invested,
            record.realized_profit,
            record.top_stocks.join(",")
        );
    }

    if !args.no_save {
        if run.results.is_empty() {
            warn!("沒有有效的回測結果可保存");
        } else {
            let output = args
                .output
                .unwrap_or_else(|| PathBuf::from(&app_config.report.output_path));
            let format = resolve_format(args.format.as_deref(), &output, &app_config.report.format)?;
            report::write_report(&output, &run.results, format)
                .with_context(|| format!("無法保存回測結果到 {}", output.display()))?;
            println!("已保存 {} 筆結果到 {}", run.results.len(), output.display());
        }
    }

    println!();
    print!("{}", BacktestSummary::from_records(&records));
    Ok(())
}

fn run_allocate_command(app_config: &ApplicationConfig, args: AllocateArgs) -> Result<()> {
    let budget = args.budget.unwrap_or(app_config.backtest.budget);
    if !budget.is_finite() || budget <= 0.0 {
        return Err(anyhow!("預算必須為正數，實際為 {}", budget));
    }

    let allocator = Allocator::new(args.max_positions.unwrap_or(app_config.backtest.max_positions));
    let candidates: Vec<Candidate> = args.candidates.into_iter().map(Candidate::from).collect();
    let prices: HashMap<String, f64> = args.prices.into_iter().collect();

    let lines = allocator.allocate(&candidates, &prices, budget);
    if lines.is_empty() {
        println!("無法產生分配計劃");
        return Ok(());
    }

    println!(
        "{:<14} {:>10} {:>10} {:>12} {:>12} {:>10}",
        "Symbol", "Price", "Return(%)", "Quantity", "Invested", "Expected"
    );
    for line in &lines {
        println!(
            "{:<14} {:>10.2} {:>9.2}% {:>12.4} {:>12.2} {:>10.2}",
            line.symbol,
            line.price,
            line.predicted_return * 100.0,
            line.quantity,
            line.invested,
            line.expected_profit
        );
    }
    let invested = total_invested(&lines);
    println!("總投入 {:.2} / 預算 {:.2}，未使用 {:.2}", invested, budget, budget - invested);
    info!(lines = lines.len(), invested, budget, "分配計劃已產生");
    Ok(())
}

fn run_summary_command(app_config: &ApplicationConfig, args: SummaryArgs) -> Result<()> {
    let input = args
        .input
        .unwrap_or_else(|| PathBuf::from(&app_config.report.output_path));
    let format = resolve_format(args.format.as_deref(), &input, &app_config.report.format)?;
    let records = report::read_report(&input, format)
        .with_context(|| format!("無法讀取回測結果 {}", input.display()))?;

    for point in report::cumulative_profit(&records) {
        println!(
            "{}  當日 {:>9.2}  累積 {:>10.2}",
            point.date, point.realized_profit, point.cumulative_profit
        );
    }
    println!();
    print!("{}", BacktestSummary::from_records(&records));
    Ok(())
}

// 初始化日誌系統
fn init_logging(log_config: &LogConfig) -> Result<Option<WorkerGuard>> {
    // RUST_LOG 優先於配置中的級別
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_config.level.to_lowercase()));

    let (file_layer, guard) = match &log_config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &log_config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    let result = if log_config.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).try_init()
    };
    result.map_err(|e| anyhow!("設置日誌系統失敗: {}", e))?;

    info!("日誌系統初始化完成");
    Ok(guard)
}
