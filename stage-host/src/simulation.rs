//! # Simulation 模块
//!
//! 无头模拟：用手动时钟按固定帧率推进会话，按计划点击开始按钮、按下空格。
//!
//! 只在编排器空闲时按键，过渡中的按键不计入计划次数，
//! 因此请求的推进次数总会完整执行。

use stage_runtime::{Clock, InputOutcome, ManualClock, Presentation};
use tracing::info;

use crate::audio::AudioPlayer;
use crate::input::{HostEvent, Key};
use crate::resources::TextureLoader;
use crate::session::Session;
use crate::surface::PresentationSurface;

/// 模拟时长上限（秒）
pub const MAX_SIMULATED_SECS: f64 = 3600.0;

/// 按键计划
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// 需要被接受的空格次数
    pub advances: u32,
    /// 每帧时长
    pub frame_dt: f64,
    /// 第一次按键的时间
    pub first_press: f64,
    /// 两次按键之间的最短间隔
    pub interval: f64,
    /// 每次按键时同时滚动的滚轮增量
    pub scroll: f32,
}

impl Plan {
    /// 由命令行参数构建计划，非法数值归一化
    pub fn new(advances: u32, fps: u32, first_press: f64, interval: f64, scroll: f32) -> Self {
        Self {
            advances,
            frame_dt: 1.0 / f64::from(fps.max(1)),
            first_press: non_negative(first_press),
            interval: non_negative(interval),
            scroll,
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// 模拟结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationReport {
    /// 被接受的输入（含开始按钮）
    pub accepted: u32,
    /// 被丢弃的输入
    pub ignored: u32,
    /// 被接受的空格次数
    pub advances: u32,
}

/// 运行模拟，直到计划完成且没有进行中的过渡
pub fn simulate<S, T, A>(session: &mut Session<S, T, A>, plan: &Plan) -> SimulationReport
where
    S: PresentationSurface,
    T: TextureLoader,
    A: AudioPlayer,
{
    let clock = ManualClock::new(0.0);
    let mut report = SimulationReport::default();
    record(&mut report, session.handle_event(HostEvent::StartClicked, clock.now()));

    let mut next_press = plan.first_press;

    while clock.now() < MAX_SIMULATED_SECS {
        let now = clock.now();

        if report.advances < plan.advances
            && now >= next_press
            && !session.orchestrator().is_busy()
        {
            if plan.scroll != 0.0 {
                session.handle_event(HostEvent::Wheel { delta_y: plan.scroll }, now);
            }
            // 绕回标题后需要重新点击开始
            let is_title = session.orchestrator().state().presentation == Presentation::Title;
            let event = if is_title {
                HostEvent::StartClicked
            } else {
                HostEvent::KeyDown(Key::Space)
            };
            let outcome = session.handle_event(event, now);
            if !is_title && outcome.is_some_and(|o| o.is_accepted()) {
                report.advances += 1;
            }
            record(&mut report, outcome);
            next_press = now + plan.interval;
        }

        for command in session.frame(now) {
            info!(t = %format!("{now:.2}"), ?command, "指令");
        }

        if report.advances >= plan.advances && !session.orchestrator().is_busy() {
            break;
        }
        clock.advance(plan.frame_dt);
    }

    info!(
        accepted = report.accepted,
        ignored = report.ignored,
        advances = report.advances,
        "输入统计"
    );
    report
}

fn record(report: &mut SimulationReport, outcome: Option<InputOutcome>) {
    match outcome {
        Some(outcome) if outcome.is_accepted() => report.accepted += 1,
        Some(_) => report.ignored += 1,
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use stage_runtime::StageCatalog;

    use super::*;
    use crate::audio::SilentAudio;
    use crate::config::AppConfig;
    use crate::resources::FsTextureLoader;
    use crate::surface::HeadlessSurface;

    fn session_in(root: &Path) -> Session<HeadlessSurface, FsTextureLoader, SilentAudio> {
        for stage in StageCatalog::builtin().iter() {
            let full = root.join(&stage.background);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            image::RgbImage::new(2, 2).save(&full).unwrap();
        }
        let config = AppConfig {
            assets_root: root.to_path_buf(),
            ..AppConfig::default()
        };
        Session::new(
            &config,
            HeadlessSurface::new(),
            FsTextureLoader::new(root),
            SilentAudio::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_plan_normalizes_values() {
        let plan = Plan::new(2, 0, f64::NAN, -3.0, 0.0);
        assert_eq!(plan.frame_dt, 1.0);
        assert_eq!(plan.first_press, 0.0);
        assert_eq!(plan.interval, 0.0);
    }

    #[test]
    fn test_every_requested_advance_commits() {
        // 14 秒间隔与绕回黑屏错开，部分计划按键时刻编排器仍在过渡中
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        let plan = Plan::new(7, 30, 3.0, 14.0, 0.0);

        let report = simulate(&mut session, &plan);

        assert_eq!(report.advances, 7);
        assert_eq!(session.orchestrator().state().completed_cycles, 7);
        assert!(!session.orchestrator().is_busy());
        assert_eq!(report.ignored, 0);
        // 开场 + 7 次空格 + 绕回后重新开始
        assert_eq!(report.accepted, 9);

        let (hits, misses) = session.textures().stats();
        assert_eq!(misses, StageCatalog::builtin().count() as u64);
        assert!(hits > 0);
    }

    #[test]
    fn test_short_interval_waits_for_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        let plan = Plan::new(3, 30, 0.0, 1.0, 100.0);

        let report = simulate(&mut session, &plan);

        assert_eq!(report.advances, 3);
        assert_eq!(report.ignored, 0);
        assert_eq!(session.orchestrator().state().completed_cycles, 3);
        assert_eq!(session.orchestrator().state().stage_index, 3);
        assert!(session.camera().angle() > 0.0);
    }

    #[test]
    fn test_zero_advances_only_opens() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());

        let report = simulate(&mut session, &Plan::new(0, 30, 0.0, 1.0, 0.0));

        assert_eq!(report.accepted, 1);
        assert_eq!(session.orchestrator().state().presentation, Presentation::Story);
        assert_eq!(session.orchestrator().state().completed_cycles, 0);
    }
}
