//! # Stage Host
//!
//! 无头模拟：按固定帧率推进会话，按计划按下开始按钮和空格键，
//! 把展示指令时间线输出到日志。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p stage-host
//! cargo run -p stage-host -- --advances 7 --interval 6 --log-level debug
//! cargo run -p stage-host --features audio -- --config config.json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use stage_host::audio::{AudioPlayer, SilentAudio};
use stage_host::config::AppConfig;
use stage_host::logging;
use stage_host::resources::FsTextureLoader;
use stage_host::session::Session;
use stage_host::simulation::{self, Plan};
use stage_host::surface::HeadlessSurface;

#[derive(Parser)]
#[command(name = "stage-host")]
#[command(about = "五阶段天空叙事 - 无头模拟运行")]
#[command(version)]
struct Cli {
    /// 配置文件（默认：config.json）
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// 资源根目录（覆盖配置）
    #[arg(long)]
    assets: Option<PathBuf>,

    /// 云层随机种子（覆盖配置）
    #[arg(long)]
    seed: Option<u64>,

    /// 需要完成的空格推进次数
    #[arg(short, long, default_value_t = 5)]
    advances: u32,

    /// 帧率
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// 两次按键的最短间隔（秒），过渡中不会按键
    #[arg(short, long, default_value_t = 14.0)]
    interval: f64,

    /// 每次按键时同时滚动的滚轮增量
    #[arg(long, default_value_t = 0.0)]
    scroll: f32,

    /// 日志级别（覆盖配置）
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::try_load(&cli.config);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    };
    if let Some(assets) = cli.assets {
        config.assets_root = assets;
    }
    if let Some(seed) = cli.seed {
        config.clouds.seed = seed;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    logging::init(&config.log_level);
    match loaded {
        Ok(_) => info!(path = %cli.config.display(), "配置文件加载成功"),
        Err(e) => warn!(error = %e, "使用默认配置"),
    }

    let textures = FsTextureLoader::new(config.assets_root.clone());
    let mut session = Session::new(&config, HeadlessSurface::new(), textures, open_audio(&config))
        .context("无法创建会话")?;

    let plan = Plan::new(
        cli.advances,
        cli.fps,
        config.timing.opening_fade_secs + 1.0,
        cli.interval,
        cli.scroll,
    );
    simulation::simulate(&mut session, &plan);

    let state = session.orchestrator().state();
    let stats = session.executor_stats();
    let (texture_hits, texture_misses) = session.textures().stats();
    info!(
        stage = state.stage_index,
        cycles = state.completed_cycles,
        frames = session.frames(),
        executed = stats.executed,
        degraded = stats.degraded,
        texture_hits,
        texture_misses,
        camera_angle = session.camera().angle(),
        "模拟结束: {}",
        session.orchestrator().current_stage().label()
    );
    Ok(())
}

fn open_audio(config: &AppConfig) -> Box<dyn AudioPlayer> {
    #[cfg(feature = "audio")]
    {
        match stage_host::audio::RodioAudio::new(config.audio.volume, config.audio.muted) {
            Ok(audio) => return Box::new(audio),
            Err(e) => warn!(error = %e, "音频设备不可用，改用静音模式"),
        }
    }
    #[cfg(not(feature = "audio"))]
    {
        let _ = config;
    }
    Box::new(SilentAudio::new())
}
